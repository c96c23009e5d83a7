//! Style profiles aggregated from Visual Analyst records.
//!
//! A profile is the statistical summary of a designer's analyzed portfolio:
//! per-attribute value frequencies weighted by analyst confidence. Profiles
//! are versioned; the Brand DNA extractor projects the latest version into
//! signature descriptors.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// GarmentAttributes
// ---------------------------------------------------------------------------

/// Attributes the Visual Analyst derives from a single image.
///
/// This is the shared shape for both portfolio ingestion and candidate
/// re-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarmentAttributes {
    pub garment_type: String,
    pub colors: Vec<String>,
    pub fabrics: Vec<String>,
    pub construction: Vec<String>,
    pub style_aesthetic: String,
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub lighting: Option<String>,
    #[serde(default)]
    pub angle: Option<String>,
    /// Analyst confidence in `0.0..=1.0`.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// StyleProfile
// ---------------------------------------------------------------------------

/// One observed attribute value with its portfolio statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeStat {
    pub value: String,
    /// Fraction of analyzed images exhibiting this value, in `0.0..=1.0`.
    pub frequency: f64,
    /// Mean analyst confidence across the images that exhibited it.
    pub confidence: f64,
}

impl AttributeStat {
    /// Ranking weight used by Brand DNA extraction.
    pub fn rank_weight(&self) -> f64 {
        self.frequency * self.confidence
    }
}

/// Aggregated statistics for a designer's portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleProfile {
    pub user_id: DbId,
    pub version: i32,
    pub images_analyzed: u32,
    /// Mean analyst confidence across the whole portfolio.
    pub overall_confidence: f64,
    pub aesthetics: Vec<AttributeStat>,
    pub colors: Vec<AttributeStat>,
    pub fabrics: Vec<AttributeStat>,
    pub construction: Vec<AttributeStat>,
    pub shot_types: Vec<AttributeStat>,
    pub lighting: Vec<AttributeStat>,
    pub angles: Vec<AttributeStat>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Build a style profile from the analyst records of a portfolio.
///
/// Each attribute list is sorted by descending `frequency * confidence`.
/// An empty record set produces an empty profile with zero confidence;
/// downstream Brand DNA enforcement treats that as "disabled", never as an
/// error.
pub fn build_style_profile(
    user_id: DbId,
    version: i32,
    records: &[GarmentAttributes],
) -> StyleProfile {
    let total = records.len() as f64;
    let overall_confidence = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.confidence).sum::<f64>() / total
    };

    StyleProfile {
        user_id,
        version,
        images_analyzed: records.len() as u32,
        overall_confidence,
        aesthetics: aggregate(records, |r| {
            vec![r.style_aesthetic.clone()]
        }),
        colors: aggregate(records, |r| r.colors.clone()),
        fabrics: aggregate(records, |r| r.fabrics.clone()),
        construction: aggregate(records, |r| r.construction.clone()),
        shot_types: aggregate(records, |r| r.shot_type.iter().cloned().collect()),
        lighting: aggregate(records, |r| r.lighting.iter().cloned().collect()),
        angles: aggregate(records, |r| r.angle.iter().cloned().collect()),
    }
}

/// Aggregate one attribute across all records into frequency/confidence
/// stats, sorted by descending rank weight.
fn aggregate<F>(records: &[GarmentAttributes], extract: F) -> Vec<AttributeStat>
where
    F: Fn(&GarmentAttributes) -> Vec<String>,
{
    use std::collections::HashMap;

    if records.is_empty() {
        return Vec::new();
    }

    // value -> (occurrence count, summed confidence)
    let mut counts: HashMap<String, (u32, f64)> = HashMap::new();
    for record in records {
        for value in extract(record) {
            let normalized = value.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let entry = counts.entry(normalized).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += record.confidence;
        }
    }

    let total = records.len() as f64;
    let mut stats: Vec<AttributeStat> = counts
        .into_iter()
        .map(|(value, (count, conf_sum))| AttributeStat {
            value,
            frequency: count as f64 / total,
            confidence: conf_sum / count as f64,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.rank_weight()
            .partial_cmp(&a.rank_weight())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.value.cmp(&b.value))
    });
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
