//! Correlation outcomes and scoring structures.
//!
//! A `Correlation` links one execution result to a canonical identity (or
//! explicitly to none). Confidence below the similarity threshold is never
//! reported as a successful match; callers can always distinguish unmatched
//! and ambiguous outcomes from confident ones.

use serde::{Deserialize, Serialize};

use super::execution::ExecutionResult;
use super::identity::CanonicalIdentity;

/// Strategy that resolved (or failed to resolve) a correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Execution-derived identifier matched a stored identifier exactly.
    DirectId,
    /// Normalized file path and title both matched.
    PathAndName,
    /// Title matched and the stored description contains the reported suite.
    NameAndSuite,
    /// Weighted fuzzy scoring cleared the similarity threshold.
    Fuzzy,
    /// No plausible candidate; a new identity was created.
    CreatedNew,
    /// Below threshold: explicitly unmatched.
    None,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectId => "direct_id",
            Self::PathAndName => "path_and_name",
            Self::NameAndSuite => "name_and_suite",
            Self::Fuzzy => "fuzzy",
            Self::CreatedNew => "created_new",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which signal dominated a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSignal {
    Name,
    Path,
    None,
}

impl Default for MatchSignal {
    fn default() -> Self {
        Self::None
    }
}

/// Weights for the composite similarity score. Normalized before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the name sub-score.
    pub name: f64,
    /// Weight of the path sub-score.
    pub path: f64,
    /// Weight of the framework sub-score.
    pub framework: f64,
    /// Weight of the content sub-score.
    pub content: f64,
    /// Weight of the context sub-score.
    pub context: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 0.4,
            path: 0.25,
            framework: 0.15,
            content: 0.1,
            context: 0.1,
        }
    }
}

impl ScoreWeights {
    /// Normalize weights so they sum to 1.0.
    pub fn normalized(&self) -> Self {
        let sum = self.name + self.path + self.framework + self.content + self.context;
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            name: self.name / sum,
            path: self.path / sum,
            framework: self.framework / sum,
            content: self.content / sum,
            context: self.context / sum,
        }
    }
}

/// Per-signal sub-scores of one (result, candidate) comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Title similarity (exact, case-insensitive, normalized, Levenshtein).
    pub name_score: f64,
    /// Path similarity (exact, filename, substring, shared segments).
    pub path_score: f64,
    /// Authoring-family compatibility (floored, never zero).
    pub framework_score: f64,
    /// Description vs. error-detail similarity.
    pub content_score: f64,
    /// Repository/branch/recency context.
    pub context_score: f64,
    /// Weighted composite in [0, 1].
    pub total: f64,
    /// Dominant signal (name vs path), `none` when total is 0.
    pub primary: MatchSignal,
}

/// A runner-up candidate retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The candidate identity.
    pub identity: CanonicalIdentity,
    /// Its composite score against the execution result.
    pub score: f64,
}

/// The outcome of correlating one execution result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    /// The execution result that was correlated.
    pub result: ExecutionResult,
    /// The matched identity; `None` when unmatched.
    pub identity: Option<CanonicalIdentity>,
    /// Confidence in [0, 1]. Below the similarity threshold this is reported
    /// with strategy `none` and no identity, never as a match.
    pub confidence: f64,
    /// Strategy that produced the outcome.
    pub strategy: ResolutionStrategy,
    /// Per-signal sub-scores backing the confidence.
    pub breakdown: ScoreBreakdown,
    /// Up to two runner-up candidates with their scores, for audit.
    pub alternatives: Vec<ScoredCandidate>,
}

impl Correlation {
    /// Whether this correlation resolved to an identity.
    pub fn is_match(&self) -> bool {
        self.identity.is_some() && self.strategy != ResolutionStrategy::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_labels() {
        assert_eq!(ResolutionStrategy::DirectId.as_str(), "direct_id");
        assert_eq!(ResolutionStrategy::CreatedNew.as_str(), "created_new");
        assert_eq!(ResolutionStrategy::None.to_string(), "none");
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        let sum = w.name + w.path + w.framework + w.content + w.context;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_normalization() {
        let w = ScoreWeights {
            name: 2.0,
            path: 1.0,
            framework: 1.0,
            content: 0.5,
            context: 0.5,
        }
        .normalized();
        let sum = w.name + w.path + w.framework + w.content + w.context;
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((w.name - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_default() {
        let w = ScoreWeights {
            name: 0.0,
            path: 0.0,
            framework: 0.0,
            content: 0.0,
            context: 0.0,
        }
        .normalized();
        assert_eq!(w, ScoreWeights::default());
    }
}
