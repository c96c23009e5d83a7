//! Feedback taxonomy and signal mapping for the bandit learner.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Validation score at or above which an auto-derived positive signal is
/// recorded alongside explicit user feedback.
pub const AUTO_POSITIVE_THRESHOLD: f64 = 85.0;

/// Source tag for feedback a user submitted directly.
pub const SOURCE_EXPLICIT: &str = "explicit";
/// Source tag for feedback derived from a high validation score.
pub const SOURCE_VALIDATION_AUTO: &str = "validation_auto";

/// User actions the learner accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Like,
    Dislike,
    Save,
    Share,
    Comment,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Like => "like",
            FeedbackType::Dislike => "dislike",
            FeedbackType::Save => "save",
            FeedbackType::Share => "share",
            FeedbackType::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "like" => Ok(FeedbackType::Like),
            "dislike" => Ok(FeedbackType::Dislike),
            "save" => Ok(FeedbackType::Save),
            "share" => Ok(FeedbackType::Share),
            "comment" => Ok(FeedbackType::Comment),
            other => Err(CoreError::Validation(format!(
                "unknown feedback type: {other}"
            ))),
        }
    }

    /// How this action moves the posterior of the tokens behind the image.
    pub fn signal(&self) -> FeedbackSignal {
        match self {
            FeedbackType::Like | FeedbackType::Save | FeedbackType::Share => {
                FeedbackSignal::Success
            }
            FeedbackType::Dislike => FeedbackSignal::Failure,
            // Comment sentiment is not analyzed; the event is stored but
            // does not move any posterior.
            FeedbackType::Comment => FeedbackSignal::Neutral,
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a posterior update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSignal {
    Success,
    Failure,
    Neutral,
}

/// Whether a validation score qualifies for an auto-derived positive signal.
pub fn auto_positive(overall_score: f64) -> bool {
    overall_score >= AUTO_POSITIVE_THRESHOLD
}

/// Aggregate counts over a user's feedback history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_events: u64,
    pub successes: u64,
    pub failures: u64,
    pub neutral: u64,
}

impl FeedbackStats {
    pub fn record(&mut self, signal: FeedbackSignal) {
        self.total_events += 1;
        match signal {
            FeedbackSignal::Success => self.successes += 1,
            FeedbackSignal::Failure => self.failures += 1,
            FeedbackSignal::Neutral => self.neutral += 1,
        }
    }

    /// Share of directional events that were successes. `None` until at
    /// least one directional event exists.
    pub fn success_rate(&self) -> Option<f64> {
        let directional = self.successes + self.failures;
        if directional == 0 {
            None
        } else {
            Some(self.successes as f64 / directional as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_actions_map_to_success() {
        assert_eq!(FeedbackType::Like.signal(), FeedbackSignal::Success);
        assert_eq!(FeedbackType::Save.signal(), FeedbackSignal::Success);
        assert_eq!(FeedbackType::Share.signal(), FeedbackSignal::Success);
    }

    #[test]
    fn dislike_maps_to_failure() {
        assert_eq!(FeedbackType::Dislike.signal(), FeedbackSignal::Failure);
    }

    #[test]
    fn comment_is_neutral() {
        assert_eq!(FeedbackType::Comment.signal(), FeedbackSignal::Neutral);
    }

    #[test]
    fn parse_round_trips() {
        for ft in [
            FeedbackType::Like,
            FeedbackType::Dislike,
            FeedbackType::Save,
            FeedbackType::Share,
            FeedbackType::Comment,
        ] {
            assert_eq!(FeedbackType::parse(ft.as_str()).unwrap(), ft);
        }
        assert!(FeedbackType::parse("upvote").is_err());
    }

    #[test]
    fn auto_positive_threshold() {
        assert!(auto_positive(85.0));
        assert!(auto_positive(92.5));
        assert!(!auto_positive(84.9));
    }

    #[test]
    fn stats_success_rate_ignores_neutral() {
        let mut stats = FeedbackStats::default();
        assert_eq!(stats.success_rate(), None);
        stats.record(FeedbackSignal::Success);
        stats.record(FeedbackSignal::Success);
        stats.record(FeedbackSignal::Failure);
        stats.record(FeedbackSignal::Neutral);
        assert_eq!(stats.total_events, 4);
        let rate = stats.success_rate().unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
