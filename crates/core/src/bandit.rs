//! Thompson Sampling posteriors and cold-start blending.
//!
//! Each (user, category, token) triple carries a Beta posterior over the
//! token's success rate. Selection draws one sample per candidate and takes
//! the argmax; outcomes increment alpha (success) or beta (failure). Users
//! with few observations in a category have their posteriors blended with
//! the global population posterior so early choices are not erratic.

use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Below this many observations in a category, a user's posteriors are
/// blended with the global population posterior.
pub const DEFAULT_COLD_START_FLOOR: u64 = 10;

// ---------------------------------------------------------------------------
// TokenPosterior
// ---------------------------------------------------------------------------

/// A Beta posterior over one token's success rate.
///
/// `alpha` and `beta` are kept >= 1 at all times; a fresh posterior is the
/// uniform prior Beta(1, 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPosterior {
    pub alpha: f64,
    pub beta: f64,
}

impl TokenPosterior {
    /// The uniform (uninformative) prior: Beta(1, 1).
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Create a posterior, clamping both parameters to the >= 1 invariant.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: alpha.max(1.0),
            beta: beta.max(1.0),
        }
    }

    /// Posterior mean: `alpha / (alpha + beta)`.
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Number of recorded observations (evidence beyond the uniform prior).
    pub fn observations(&self) -> f64 {
        (self.alpha - 1.0) + (self.beta - 1.0)
    }

    /// Record one outcome.
    pub fn record(&mut self, success: bool) {
        if success {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
    }

    /// Draw one Thompson sample from this posterior.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // alpha and beta are >= 1 by construction; Beta::new only fails on
        // non-positive or non-finite parameters.
        match Beta::new(self.alpha, self.beta) {
            Ok(dist) => dist.sample(rng),
            Err(_) => self.mean(),
        }
    }
}

impl Default for TokenPosterior {
    fn default() -> Self {
        Self::uniform()
    }
}

// ---------------------------------------------------------------------------
// Cold-start blending
// ---------------------------------------------------------------------------

/// Blend a user posterior with the global population posterior for the same
/// token.
///
/// Applied only while the user's total observations in the category
/// (`user_category_observations`) are below `floor`. The global posterior
/// contributes pseudo-observations at its own mean, bounded by both the
/// remaining gap to the floor and the amount of global evidence actually
/// available — a user never inherits more population evidence than exists,
/// and never more than it would take to reach the floor.
pub fn blend_posteriors(
    user: &TokenPosterior,
    global: &TokenPosterior,
    user_category_observations: u64,
    floor: u64,
) -> TokenPosterior {
    if user_category_observations >= floor {
        return user.clone();
    }

    let gap = (floor - user_category_observations) as f64;
    let pseudo = gap.min(global.observations());
    if pseudo <= 0.0 {
        return user.clone();
    }

    let g_mean = global.mean();
    TokenPosterior::new(
        user.alpha + g_mean * pseudo,
        user.beta + (1.0 - g_mean) * pseudo,
    )
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Thompson-sample every candidate posterior and return the argmax index.
///
/// Returns `None` for an empty candidate set.
pub fn select_index<R: Rng + ?Sized>(
    rng: &mut R,
    posteriors: &[TokenPosterior],
) -> Option<usize> {
    select_weighted_index(rng, posteriors, None)
}

/// Thompson selection with optional per-candidate weight multipliers.
///
/// Weights scale each candidate's drawn sample before the argmax; brand-DNA
/// enforcement uses this to bias selection toward signature tokens without
/// removing anything from the candidate set. A missing `weights` slice means
/// all candidates weigh 1.0.
pub fn select_weighted_index<R: Rng + ?Sized>(
    rng: &mut R,
    posteriors: &[TokenPosterior],
    weights: Option<&[f64]>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, posterior) in posteriors.iter().enumerate() {
        let weight = weights.and_then(|w| w.get(i)).copied().unwrap_or(1.0);
        let score = posterior.sample(rng) * weight;
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // -- TokenPosterior -------------------------------------------------------

    #[test]
    fn uniform_prior_has_mean_half() {
        assert!((TokenPosterior::uniform().mean() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn new_clamps_to_invariant() {
        let p = TokenPosterior::new(0.2, -3.0);
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.beta, 1.0);
    }

    #[test]
    fn record_increments_only_one_side() {
        let mut p = TokenPosterior::uniform();
        p.record(true);
        assert_eq!((p.alpha, p.beta), (2.0, 1.0));
        p.record(false);
        assert_eq!((p.alpha, p.beta), (2.0, 2.0));
    }

    #[test]
    fn observations_counts_evidence_beyond_prior() {
        let mut p = TokenPosterior::uniform();
        assert_eq!(p.observations(), 0.0);
        p.record(true);
        p.record(false);
        p.record(false);
        assert_eq!(p.observations(), 3.0);
    }

    #[test]
    fn samples_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = TokenPosterior::new(12.0, 3.0);
        for _ in 0..200 {
            let s = p.sample(&mut rng);
            assert!((0.0..=1.0).contains(&s), "sample {s} out of range");
        }
    }

    // -- Cold-start blending --------------------------------------------------

    #[test]
    fn blend_is_identity_at_or_above_floor() {
        let user = TokenPosterior::new(6.0, 6.0);
        let global = TokenPosterior::new(50.0, 10.0);
        let blended = blend_posteriors(&user, &global, 10, 10);
        assert_eq!(blended, user);
    }

    #[test]
    fn blend_is_identity_without_global_evidence() {
        let user = TokenPosterior::uniform();
        let global = TokenPosterior::uniform();
        let blended = blend_posteriors(&user, &global, 0, 10);
        assert_eq!(blended, user);
    }

    #[test]
    fn blend_pulls_cold_user_toward_global_mean() {
        let user = TokenPosterior::uniform();
        // Global evidence strongly favours the token.
        let global = TokenPosterior::new(41.0, 11.0); // 50 observations, mean 0.788..
        let blended = blend_posteriors(&user, &global, 0, 10);

        // Exactly 10 pseudo-observations were added.
        assert!((blended.observations() - 10.0).abs() < 1e-9);
        assert!(blended.mean() > user.mean());
        assert!(blended.mean() < global.mean() + 1e-9);
    }

    #[test]
    fn blend_is_bounded_by_available_global_evidence() {
        let user = TokenPosterior::uniform();
        let global = TokenPosterior::new(3.0, 2.0); // only 3 observations
        let blended = blend_posteriors(&user, &global, 0, 10);
        assert!((blended.observations() - 3.0).abs() < 1e-9);
    }

    // -- Selection ------------------------------------------------------------

    #[test]
    fn empty_candidate_set_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_index(&mut rng, &[]), None);
    }

    #[test]
    fn identical_seed_gives_identical_selection() {
        let posteriors = vec![TokenPosterior::uniform(); 5];
        let a = select_index(&mut StdRng::seed_from_u64(42), &posteriors);
        let b = select_index(&mut StdRng::seed_from_u64(42), &posteriors);
        assert_eq!(a, b);
    }

    /// Cold-start invariant: with uniform priors, selection over many trials
    /// approaches a uniform distribution over the candidates.
    #[test]
    fn cold_start_selection_is_near_uniform() {
        let mut rng = StdRng::seed_from_u64(99);
        let posteriors = vec![TokenPosterior::uniform(); 4];
        let trials = 20_000;
        let mut counts = [0u32; 4];
        for _ in 0..trials {
            counts[select_index(&mut rng, &posteriors).unwrap()] += 1;
        }

        let expected = trials as f64 / 4.0;
        for count in counts {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "counts {counts:?} deviate from uniform");
        }
    }

    /// Monotonicity: a recorded success strictly increases a token's
    /// selection probability relative to an otherwise identical token.
    #[test]
    fn recorded_success_increases_selection_probability() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut favoured = TokenPosterior::uniform();
        favoured.record(true);
        let posteriors = vec![favoured, TokenPosterior::uniform()];

        let trials = 20_000;
        let mut favoured_wins = 0u32;
        for _ in 0..trials {
            if select_index(&mut rng, &posteriors) == Some(0) {
                favoured_wins += 1;
            }
        }

        // Beta(2,1) vs Beta(1,1): P(win) = 2/3. Require a clear majority.
        let share = favoured_wins as f64 / trials as f64;
        assert!(share > 0.60, "favoured token won only {share:.3} of trials");
    }

    #[test]
    fn weights_bias_selection() {
        let mut rng = StdRng::seed_from_u64(3);
        let posteriors = vec![TokenPosterior::uniform(); 2];
        let weights = [1.0, 0.05];

        let trials = 5_000;
        let mut first_wins = 0u32;
        for _ in 0..trials {
            if select_weighted_index(&mut rng, &posteriors, Some(&weights)) == Some(0) {
                first_wins += 1;
            }
        }
        assert!(first_wins as f64 / trials as f64 > 0.9);
    }
}
