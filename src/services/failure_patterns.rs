//! Failure pattern detection.
//!
//! Classifies how one canonical identity's failures recur over a lookback
//! window. Fewer than three failures is "not enough data" (`None`), not an
//! error; significance filtering is applied only by the batch API so single
//! lookups can still inspect weak patterns.

use chrono::Duration;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CorrelatedFailure, FailurePattern, PatternKind};
use crate::domain::ports::CorrelationRepository;

/// Minimum failures before any pattern is reported.
const MIN_FAILURES: usize = 3;

/// Frequency gate for the persistent classification.
const PERSISTENT_MIN_FREQUENCY: usize = 5;

/// Consistency gate (exclusive) for the persistent classification.
const PERSISTENT_MIN_CONSISTENCY: f64 = 0.8;

/// Span gate for the recent-spike classification.
const SPIKE_WINDOW_DAYS: i64 = 7;

/// Consistency gate (exclusive) for the consistent classification.
const CONSISTENT_MIN_CONSISTENCY: f64 = 0.6;

/// Patterns at or below this significance are dropped by the batch API.
const SIGNIFICANCE_FLOOR: f64 = 0.5;

/// Classifies failure recurrence for canonical identities.
#[derive(Debug, Clone)]
pub struct FailurePatternDetector {
    lookback: usize,
}

impl Default for FailurePatternDetector {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FailurePatternDetector {
    /// Create a detector consulting at most `lookback` recent failures.
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    /// Classify one identity's recent failures.
    ///
    /// Returns `None` for fewer than three failures. The slice is expected to
    /// hold failures of a single identity; the newest `lookback` entries are
    /// consulted.
    pub fn detect(&self, failures: &[CorrelatedFailure]) -> Option<FailurePattern> {
        if failures.len() < MIN_FAILURES {
            return None;
        }

        let mut window: Vec<&CorrelatedFailure> = failures.iter().collect();
        window.sort_by_key(|f| std::cmp::Reverse(f.occurred_at));
        window.truncate(self.lookback);

        let identity_id = window.first()?.identity_id.clone();
        let frequency = window.len();
        let first_seen = window.iter().map(|f| f.occurred_at).min()?;
        let last_seen = window.iter().map(|f| f.occurred_at).max()?;
        let consistency = message_consistency(&window);
        let span = last_seen - first_seen;

        let (kind, significance) = classify(frequency, consistency, span);
        debug!(
            identity = identity_id.as_str(),
            frequency,
            consistency,
            kind = %kind,
            "classified failure pattern"
        );

        Some(FailurePattern {
            identity_id,
            frequency,
            first_seen,
            last_seen,
            consistency,
            kind,
            significance,
        })
    }

    /// Classify each identity's failure group and keep only significant
    /// patterns (significance above 0.5).
    pub fn detect_significant(
        &self,
        groups: &[Vec<CorrelatedFailure>],
    ) -> Vec<FailurePattern> {
        groups
            .iter()
            .filter_map(|failures| self.detect(failures))
            .filter(|pattern| pattern.significance > SIGNIFICANCE_FLOOR)
            .collect()
    }

    /// Load one identity's recent failures from storage and classify them.
    pub async fn detect_for_identity<C: CorrelationRepository>(
        &self,
        repository: &C,
        identity_id: &str,
    ) -> DomainResult<Option<FailurePattern>> {
        let failures = repository.recent_failures(identity_id, self.lookback).await?;
        Ok(self.detect(&failures))
    }
}

/// `1 - distinct/total` over the exact message texts.
fn message_consistency(window: &[&CorrelatedFailure]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mut distinct: Vec<&str> = Vec::new();
    for failure in window {
        if !distinct.contains(&failure.message.as_str()) {
            distinct.push(&failure.message);
        }
    }
    1.0 - distinct.len() as f64 / window.len() as f64
}

/// Classification ladder, first match wins.
fn classify(frequency: usize, consistency: f64, span: Duration) -> (PatternKind, f64) {
    if frequency >= PERSISTENT_MIN_FREQUENCY && consistency > PERSISTENT_MIN_CONSISTENCY {
        (PatternKind::Persistent, 0.9)
    } else if frequency >= MIN_FAILURES && span < Duration::days(SPIKE_WINDOW_DAYS) {
        (PatternKind::RecentSpike, 0.7)
    } else if consistency > CONSISTENT_MIN_CONSISTENCY {
        (PatternKind::Consistent, 0.6)
    } else {
        (PatternKind::Intermittent, 0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn failures(messages: &[&str], spacing: Duration) -> Vec<CorrelatedFailure> {
        let start = Utc::now() - spacing * i32::try_from(messages.len()).unwrap_or(i32::MAX);
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                CorrelatedFailure::new(
                    "identity-1",
                    *message,
                    start + spacing * i32::try_from(i).unwrap_or(i32::MAX),
                )
            })
            .collect()
    }

    #[test]
    fn test_fewer_than_three_failures_is_none() {
        let detector = FailurePatternDetector::default();
        assert!(detector.detect(&[]).is_none());
        assert!(detector.detect(&failures(&["boom", "boom"], Duration::hours(1))).is_none());
    }

    #[test]
    fn test_persistent_pattern() {
        // Six identical failures spread over more than a week: frequent and
        // perfectly consistent.
        let detector = FailurePatternDetector::default();
        let history = failures(&["timeout"; 6], Duration::days(2));
        let pattern = detector.detect(&history).unwrap();

        assert_eq!(pattern.kind, PatternKind::Persistent);
        assert_eq!(pattern.frequency, 6);
        assert!((pattern.consistency - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
        assert_eq!(pattern.significance, 0.9);
    }

    #[test]
    fn test_recent_spike_pattern() {
        // Five failures within three days, four sharing a message: the
        // consistency (1 - 2/5 = 0.6) misses the persistent gate, the short
        // span wins.
        let detector = FailurePatternDetector::default();
        let history = failures(
            &["timeout", "timeout", "timeout", "timeout", "connection reset"],
            Duration::hours(12),
        );
        let pattern = detector.detect(&history).unwrap();

        assert_eq!(pattern.kind, PatternKind::RecentSpike);
        assert_eq!(pattern.frequency, 5);
        assert!(pattern.span() < Duration::days(7));
        assert_eq!(pattern.significance, 0.7);
    }

    #[test]
    fn test_consistent_pattern() {
        // Slow but message-consistent: four failures over four weeks.
        let detector = FailurePatternDetector::default();
        let history = failures(&["oom", "oom", "oom", "oom"], Duration::days(10));
        let pattern = detector.detect(&history).unwrap();

        assert_eq!(pattern.kind, PatternKind::Consistent);
        assert_eq!(pattern.significance, 0.6);
    }

    #[test]
    fn test_intermittent_pattern() {
        let detector = FailurePatternDetector::default();
        let history = failures(&["a", "b", "c", "d"], Duration::days(10));
        let pattern = detector.detect(&history).unwrap();

        assert_eq!(pattern.kind, PatternKind::Intermittent);
        assert_eq!(pattern.significance, 0.3);
    }

    #[test]
    fn test_lookback_truncates_to_newest() {
        let detector = FailurePatternDetector::new(3);
        // Twelve failures; only the newest three are consulted.
        let history = failures(&["x"; 12], Duration::hours(1));
        let pattern = detector.detect(&history).unwrap();
        assert_eq!(pattern.frequency, 3);
    }

    #[test]
    fn test_batch_filters_insignificant_patterns() {
        let detector = FailurePatternDetector::default();
        let groups = vec![
            failures(&["timeout"; 6], Duration::days(2)), // persistent, 0.9
            failures(&["oom", "oom", "oom", "oom"], Duration::days(10)), // consistent, 0.6
            failures(&["a", "b", "c", "d"], Duration::days(10)), // intermittent, 0.3
            failures(&["too", "few"], Duration::hours(1)), // not enough data
        ];
        let significant = detector.detect_significant(&groups);

        assert_eq!(significant.len(), 2);
        assert_eq!(significant[0].kind, PatternKind::Persistent);
        assert_eq!(significant[1].kind, PatternKind::Consistent);
    }
}
