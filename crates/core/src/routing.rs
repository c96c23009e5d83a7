//! Traffic routing between prompt builder variants.
//!
//! A configured percentage of batches is routed to the experimental builder
//! for controlled comparison. Assignment hashes `(user_id, batch_id)` so it
//! is deterministic, uniformly spread, and sticky for every image within one
//! batch. Explicit exploration re-rolls with a per-image salt instead.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// BuilderVariant
// ---------------------------------------------------------------------------

/// The prompt builder implementations under experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderVariant {
    /// The production composer.
    Standard,
    /// The candidate composer receiving the experimental traffic share.
    Experimental,
}

impl BuilderVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderVariant::Standard => "standard",
            BuilderVariant::Experimental => "experimental",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "standard" => Ok(BuilderVariant::Standard),
            "experimental" => Ok(BuilderVariant::Experimental),
            other => Err(CoreError::Validation(format!(
                "Unknown builder variant '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Assign a batch to a builder variant.
///
/// `experimental_percent` is the share of traffic (0-100) routed to the
/// experimental builder. The same `(user_id, batch_id)` pair always lands in
/// the same bucket, which makes the assignment sticky across every image of
/// the batch.
pub fn assign_variant(user_id: DbId, batch_id: Uuid, experimental_percent: u8) -> BuilderVariant {
    if experimental_percent == 0 {
        return BuilderVariant::Standard;
    }
    if experimental_percent >= 100 {
        return BuilderVariant::Experimental;
    }
    if bucket(user_id, batch_id, None) < experimental_percent as u64 {
        BuilderVariant::Experimental
    } else {
        BuilderVariant::Standard
    }
}

/// Per-image assignment for explicit exploration requests: the image index
/// salts the hash so images within one batch may land in different buckets.
pub fn assign_variant_exploring(
    user_id: DbId,
    batch_id: Uuid,
    image_index: u32,
    experimental_percent: u8,
) -> BuilderVariant {
    if experimental_percent == 0 {
        return BuilderVariant::Standard;
    }
    if experimental_percent >= 100 {
        return BuilderVariant::Experimental;
    }
    if bucket(user_id, batch_id, Some(image_index)) < experimental_percent as u64 {
        BuilderVariant::Experimental
    } else {
        BuilderVariant::Standard
    }
}

/// SHA-256 bucket in `0..100`.
fn bucket(user_id: DbId, batch_id: Uuid, salt: Option<u32>) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_be_bytes());
    hasher.update(batch_id.as_bytes());
    if let Some(salt) = salt {
        hasher.update(salt.to_be_bytes());
    }
    let digest = hasher.finalize();
    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(first8) % 100
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
