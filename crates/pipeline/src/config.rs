//! Engine configuration loaded from environment variables.

use atelier_core::bandit::DEFAULT_COLD_START_FLOOR;
use atelier_core::brand_dna::DEFAULT_ENFORCEMENT_STRENGTH;
use atelier_core::feedback::AUTO_POSITIVE_THRESHOLD;
use atelier_core::overgen::{DEFAULT_BUFFER_PERCENT, MAX_GENERATE_COUNT};
use atelier_core::prompt::DEFAULT_RESAMPLE_LIMIT;

/// Tunable engine parameters.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Surplus percentage applied to every batch (default: `20`).
    pub buffer_percent: u32,
    /// Hard cap on candidates generated per batch (default: `100`).
    pub max_generate_count: u32,
    /// Concurrent provider calls per batch (default: `5`).
    pub batch_width: usize,
    /// Pause between concurrency waves, for provider rate limits
    /// (default: `500` ms).
    pub pacing_ms: u64,
    /// Timeout for one provider call (default: `30` s).
    pub call_timeout_secs: u64,
    /// Overall batch deadline; on expiry the batch finalizes with
    /// whatever completed (default: `300` s).
    pub batch_timeout_secs: u64,
    /// Share of batches routed to the experimental composer (default: `10`).
    pub experimental_percent: u8,
    /// Observation floor below which user posteriors blend with the
    /// population (default: `10`).
    pub cold_start_floor: u64,
    /// Validation score that auto-derives a positive feedback signal
    /// (default: `85`).
    pub auto_positive_threshold: f64,
    /// Resample attempts before a duplicate token combination is allowed
    /// (default: `3`).
    pub resample_limit: u32,
    /// Brand-DNA bias strength when the caller does not set one
    /// (default: `0.7`).
    pub default_enforcement_strength: f64,
    /// Accepted-candidate window for the user success baseline
    /// (default: `50`).
    pub baseline_window: i64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `BUFFER_PERCENT`           | `20`    |
    /// | `MAX_GENERATE_COUNT`       | `100`   |
    /// | `BATCH_WIDTH`              | `5`     |
    /// | `PACING_MS`                | `500`   |
    /// | `CALL_TIMEOUT_SECS`        | `30`    |
    /// | `BATCH_TIMEOUT_SECS`       | `300`   |
    /// | `EXPERIMENTAL_PERCENT`     | `10`    |
    /// | `COLD_START_FLOOR`         | `10`    |
    /// | `AUTO_POSITIVE_THRESHOLD`  | `85`    |
    /// | `RESAMPLE_LIMIT`           | `3`     |
    /// | `ENFORCEMENT_STRENGTH`     | `0.7`   |
    /// | `BASELINE_WINDOW`          | `50`    |
    pub fn from_env() -> Self {
        Self {
            buffer_percent: env_parse("BUFFER_PERCENT", DEFAULT_BUFFER_PERCENT),
            max_generate_count: env_parse("MAX_GENERATE_COUNT", MAX_GENERATE_COUNT),
            batch_width: env_parse("BATCH_WIDTH", 5),
            pacing_ms: env_parse("PACING_MS", 500),
            call_timeout_secs: env_parse("CALL_TIMEOUT_SECS", 30),
            batch_timeout_secs: env_parse("BATCH_TIMEOUT_SECS", 300),
            experimental_percent: env_parse("EXPERIMENTAL_PERCENT", 10),
            cold_start_floor: env_parse("COLD_START_FLOOR", DEFAULT_COLD_START_FLOOR),
            auto_positive_threshold: env_parse("AUTO_POSITIVE_THRESHOLD", AUTO_POSITIVE_THRESHOLD),
            resample_limit: env_parse("RESAMPLE_LIMIT", DEFAULT_RESAMPLE_LIMIT),
            default_enforcement_strength: env_parse(
                "ENFORCEMENT_STRENGTH",
                DEFAULT_ENFORCEMENT_STRENGTH,
            ),
            baseline_window: env_parse("BASELINE_WINDOW", 50),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            max_generate_count: MAX_GENERATE_COUNT,
            batch_width: 5,
            pacing_ms: 500,
            call_timeout_secs: 30,
            batch_timeout_secs: 300,
            experimental_percent: 10,
            cold_start_floor: DEFAULT_COLD_START_FLOOR,
            auto_positive_threshold: AUTO_POSITIVE_THRESHOLD,
            resample_limit: DEFAULT_RESAMPLE_LIMIT,
            default_enforcement_strength: DEFAULT_ENFORCEMENT_STRENGTH,
            baseline_window: 50,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid value")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.buffer_percent, 20);
        assert_eq!(config.batch_width, 5);
        assert_eq!(config.experimental_percent, 10);
        assert_eq!(config.cold_start_floor, 10);
        assert_eq!(config.auto_positive_threshold, 85.0);
        assert_eq!(config.resample_limit, 3);
    }
}
