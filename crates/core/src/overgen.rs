//! Over-generation arithmetic.
//!
//! The orchestrator requests a buffered surplus of candidates so validation
//! can discard the worst and still usually fill the requested count. The
//! arithmetic here is deliberately integer-exact.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard ceiling on candidates per batch, regardless of input.
pub const MAX_GENERATE_COUNT: u32 = 100;

/// Default surplus percentage.
pub const DEFAULT_BUFFER_PERCENT: u32 = 20;

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

/// Number of candidates to generate for a request.
///
/// `ceil(requested * (1 + buffer_percent / 100))`, capped at
/// [`MAX_GENERATE_COUNT`]. A zero request generates nothing.
pub fn generate_count(requested: u32, buffer_percent: u32) -> u32 {
    if requested == 0 {
        return 0;
    }
    let scaled = requested as u64 * (100 + buffer_percent as u64);
    let count = scaled.div_ceil(100);
    (count as u32).min(MAX_GENERATE_COUNT)
}

/// How many accepted candidates the batch fell short by.
pub fn shortfall(requested: u32, accepted: u32) -> u32 {
    requested.saturating_sub(accepted)
}

/// Total cost across completed units only.
pub fn total_cost_cents<I: IntoIterator<Item = i64>>(completed_costs: I) -> i64 {
    completed_costs.into_iter().sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
