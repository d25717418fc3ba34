//! Failure recurrence patterns.
//!
//! Derived, read-mostly artifacts: recomputed from correlated failure history,
//! never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One correlated failure of a canonical identity, as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedFailure {
    /// The canonical identity the failure was correlated to.
    pub identity_id: String,
    /// Primary error message of the failure.
    pub message: String,
    /// When the failure occurred.
    pub occurred_at: DateTime<Utc>,
}

impl CorrelatedFailure {
    pub fn new(
        identity_id: impl Into<String>,
        message: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity_id: identity_id.into(),
            message: message.into(),
            occurred_at,
        }
    }
}

/// Classification of how a test's failures recur over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Frequent and highly message-consistent.
    Persistent,
    /// Several failures inside a short window.
    RecentSpike,
    /// Message-consistent but not frequent enough to be persistent.
    Consistent,
    /// No stable shape.
    Intermittent,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::RecentSpike => "recent_spike",
            Self::Consistent => "consistent",
            Self::Intermittent => "intermittent",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified failure pattern for one canonical identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePattern {
    /// The identity the pattern describes.
    pub identity_id: String,
    /// Number of failures inside the lookback window.
    pub frequency: usize,
    /// Earliest failure timestamp in the window.
    pub first_seen: DateTime<Utc>,
    /// Latest failure timestamp in the window.
    pub last_seen: DateTime<Utc>,
    /// Message-consistency ratio in [0, 1]: 1 means every failure carried the
    /// same message.
    pub consistency: f64,
    /// Pattern classification.
    pub kind: PatternKind,
    /// Significance score in [0, 1]; the batch API filters <= 0.5.
    pub significance: f64,
}

impl FailurePattern {
    /// Time span covered by the observed failures.
    pub fn span(&self) -> chrono::Duration {
        self.last_seen - self.first_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_span() {
        let start = Utc::now();
        let pattern = FailurePattern {
            identity_id: "abc".to_string(),
            frequency: 4,
            first_seen: start,
            last_seen: start + Duration::days(2),
            consistency: 0.75,
            kind: PatternKind::Consistent,
            significance: 0.6,
        };
        assert_eq!(pattern.span(), Duration::days(2));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PatternKind::RecentSpike.as_str(), "recent_spike");
        assert_eq!(PatternKind::Persistent.to_string(), "persistent");
    }
}
