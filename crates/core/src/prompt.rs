//! Prompt artifact assembly.
//!
//! The composer samples one token per category, then this module turns the
//! selection into the positive/negative prompt pair plus the structured
//! metadata that is persisted alongside it. Metadata is tagged with a schema
//! version so it can evolve; re-serializing it reproduces the exact token
//! set used to build the prompt text.

use serde::{Deserialize, Serialize};

use crate::brand_dna::BrandDna;
use crate::token::TokenCategory;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current metadata schema version.
pub const METADATA_SCHEMA_VERSION: u32 = 1;

/// Baseline negative prompt terms applied to every generation.
pub const NEGATIVE_BASELINE: &[&str] = &[
    "blurry",
    "low quality",
    "distorted anatomy",
    "extra limbs",
    "watermark",
    "text overlay",
];

/// Resample attempts before a duplicate token combination is allowed.
pub const DEFAULT_RESAMPLE_LIMIT: u32 = 3;

/// Aesthetic terms paired with the terms that oppose them. Used to extend
/// the negative prompt with anti-signatures of the designer's brand.
const OPPOSING_AESTHETICS: &[(&str, &[&str])] = &[
    ("minimalist", &["cluttered", "busy patterns", "maximalist"]),
    ("romantic", &["harsh lines", "industrial"]),
    ("avant-garde", &["conventional", "plain basics"]),
    ("classic", &["garish", "novelty print"]),
    ("sporty", &["formal evening wear", "stiff tailoring"]),
    ("bohemian", &["corporate", "rigid structure"]),
];

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// One sampled token with the posterior mean it was selected under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedToken {
    pub category: TokenCategory,
    pub value: String,
    /// Posterior mean at selection time, for later attribution.
    pub weight: f64,
}

/// Structured metadata persisted with every prompt artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub schema_version: u32,
    /// RNG seed the batch was composed under; identical seed reproduces the
    /// identical artifact.
    pub seed: u64,
    pub builder_variant: String,
    pub tokens: Vec<SelectedToken>,
    pub brand_consistency_score: f64,
    /// True when Brand DNA enforcement was requested but silently disabled.
    pub enforcement_disabled: bool,
    /// True when user modifiers were weighted ahead of sampled tokens.
    pub modifier_emphasis: bool,
}

impl PromptMetadata {
    /// The token combination this artifact used, as a canonical key.
    pub fn combination_key(&self) -> String {
        combination_key(&self.tokens)
    }
}

/// Canonical key for a full token combination, used for within-batch
/// diversity checks. Category order is fixed, so two selections of the same
/// tokens always produce the same key.
pub fn combination_key(tokens: &[SelectedToken]) -> String {
    let mut parts: Vec<String> = tokens
        .iter()
        .map(|t| format!("{}={}", t.category.as_str(), t.value))
        .collect();
    parts.sort();
    parts.join("|")
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Everything needed to assemble one prompt.
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    pub garment_type: &'a str,
    pub tokens: &'a [SelectedToken],
    /// User free-text modifiers, already trimmed.
    pub modifiers: Option<&'a str>,
    /// When true, modifiers lead the prompt and sampled tokens trail it.
    pub high_specificity: bool,
    pub primary_aesthetic: Option<&'a str>,
}

/// An assembled positive/negative prompt pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub positive: String,
    pub negative: String,
}

/// Assemble the prompt text for one candidate image.
///
/// Ordering: garment type first, then either modifiers before tokens
/// (high-specificity intent) or tokens before modifiers. The primary
/// aesthetic, when present, closes the prompt as a style clause.
pub fn assemble_prompt(inputs: &PromptInputs<'_>, anti_signatures: &[String]) -> AssembledPrompt {
    let token_text = inputs
        .tokens
        .iter()
        .map(|t| t.value.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut parts: Vec<String> = vec![inputs.garment_type.to_string()];
    match (inputs.modifiers, inputs.high_specificity) {
        (Some(modifiers), true) if !modifiers.is_empty() => {
            parts.push(modifiers.to_string());
            if !token_text.is_empty() {
                parts.push(token_text);
            }
        }
        (Some(modifiers), false) if !modifiers.is_empty() => {
            if !token_text.is_empty() {
                parts.push(token_text);
            }
            parts.push(modifiers.to_string());
        }
        _ => {
            if !token_text.is_empty() {
                parts.push(token_text);
            }
        }
    }
    if let Some(aesthetic) = inputs.primary_aesthetic {
        if !aesthetic.is_empty() {
            parts.push(format!("in a {aesthetic} aesthetic"));
        }
    }
    parts.push("professional fashion photography".to_string());

    AssembledPrompt {
        positive: parts.join(", "),
        negative: negative_prompt(anti_signatures),
    }
}

/// The negative prompt: fixed baseline plus brand anti-signatures.
pub fn negative_prompt(anti_signatures: &[String]) -> String {
    let mut terms: Vec<&str> = NEGATIVE_BASELINE.to_vec();
    for term in anti_signatures {
        if !terms.contains(&term.as_str()) {
            terms.push(term);
        }
    }
    terms.join(", ")
}

/// Terms opposing the designer's aesthetic signatures.
///
/// Unknown aesthetics contribute nothing; the negative baseline always
/// applies regardless.
pub fn anti_signatures(dna: &BrandDna) -> Vec<String> {
    let mut out = Vec::new();
    let mut push_for = |aesthetic: &str| {
        for (name, opposites) in OPPOSING_AESTHETICS {
            if aesthetic.contains(name) {
                out.extend(opposites.iter().map(|o| o.to_string()));
            }
        }
    };
    push_for(&dna.primary_aesthetic);
    for secondary in &dna.secondary_aesthetics {
        push_for(secondary);
    }
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
