//! Weighted similarity scoring between execution results and candidates.
//!
//! Five independent sub-scores, each in [0, 1], combined by configurable
//! weights (name 0.4, path 0.25, framework 0.15, content 0.1, context 0.1 by
//! default). The framework sub-score is floored at 0.3: missing family
//! information must never veto an otherwise strong match.

use chrono::Utc;

use crate::domain::models::{
    BuildContext, CanonicalIdentity, ExecutionResult, MatchSignal, ScoreBreakdown, ScoreWeights,
};
use crate::services::normalizer::{normalize, normalize_path};

/// Days over which the recency component of the context score decays to zero.
const RECENCY_WINDOW_DAYS: f64 = 30.0;

/// Floor for the framework sub-score.
const FRAMEWORK_FLOOR: f64 = 0.3;

/// Computes composite similarity scores.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: ScoreWeights,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl WeightedScorer {
    /// Create a scorer; weights are normalized to sum to 1.
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights: weights.normalized(),
        }
    }

    /// Score one candidate against one execution result.
    pub fn score(
        &self,
        result: &ExecutionResult,
        candidate: &CanonicalIdentity,
        context: &BuildContext,
    ) -> ScoreBreakdown {
        let name_score = name_score(&result.title, &candidate.title);
        let path_score = path_score(result.file_path.as_deref(), &candidate.file_path);
        let framework_score = framework_score(result, candidate);
        let content_score = content_score(result, candidate);
        let context_score = context_score(candidate, context);

        let total = self.weights.name * name_score
            + self.weights.path * path_score
            + self.weights.framework * framework_score
            + self.weights.content * content_score
            + self.weights.context * context_score;
        let total = total.clamp(0.0, 1.0);

        let primary = if total == 0.0 {
            MatchSignal::None
        } else if path_score > name_score {
            MatchSignal::Path
        } else {
            MatchSignal::Name
        };

        ScoreBreakdown {
            name_score,
            path_score,
            framework_score,
            content_score,
            context_score,
            total,
            primary,
        }
    }
}

/// Title similarity: exact 1.0, case-insensitive 0.95, normalized 0.9, else
/// Levenshtein-derived similarity of the normalized forms.
fn name_score(reported: &str, stored: &str) -> f64 {
    if reported == stored {
        return 1.0;
    }
    if reported.eq_ignore_ascii_case(stored) {
        return 0.95;
    }
    let reported_norm = normalize(reported);
    let stored_norm = normalize(stored);
    if !reported_norm.is_empty() && reported_norm == stored_norm {
        return 0.9;
    }
    levenshtein_similarity(&reported_norm, &stored_norm)
}

/// Path similarity: exact 1.0, same filename 0.8, substring containment 0.6,
/// else the fraction of shared segments capped at 0.5. A result without a
/// reported path scores 0.
fn path_score(reported: Option<&str>, stored: &str) -> f64 {
    let Some(reported) = reported else {
        return 0.0;
    };
    let reported = normalize_path(reported);
    if reported.is_empty() {
        return 0.0;
    }
    let stored = normalize_path(stored);
    if reported == stored {
        return 1.0;
    }
    let reported_file = reported.rsplit('/').next().unwrap_or(&reported);
    let stored_file = stored.rsplit('/').next().unwrap_or(&stored);
    if !reported_file.is_empty() && reported_file == stored_file {
        return 0.8;
    }
    if reported.contains(&stored) || stored.contains(&reported) {
        return 0.6;
    }
    shared_segment_fraction(&reported, &stored).min(0.5)
}

fn shared_segment_fraction(a: &str, b: &str) -> f64 {
    let segments_a: Vec<&str> = a.split('/').collect();
    let segments_b: Vec<&str> = b.split('/').collect();
    let longest = segments_a.len().max(segments_b.len());
    if longest == 0 {
        return 0.0;
    }
    let shared = segments_a
        .iter()
        .filter(|segment| segments_b.contains(segment))
        .count();
    shared as f64 / longest as f64
}

/// Family compatibility: 1.0 on a match with the family inferred from the
/// result's surface characteristics, 0.7 when the families share declaration
/// syntax, floored at 0.3 otherwise.
fn framework_score(result: &ExecutionResult, candidate: &CanonicalIdentity) -> f64 {
    let inferred = result.inferred_family();
    if inferred == candidate.family {
        1.0
    } else if inferred.shares_declaration_syntax(candidate.family) {
        0.7
    } else {
        FRAMEWORK_FLOOR
    }
}

/// Description vs. error-detail similarity when both sides have text.
fn content_score(result: &ExecutionResult, candidate: &CanonicalIdentity) -> f64 {
    match result.detail_text() {
        Some(detail) if !candidate.description.trim().is_empty() => {
            levenshtein_similarity(&normalize(&detail), &normalize(&candidate.description))
        }
        _ => 0.0,
    }
}

/// Build-context affinity: up to 0.5 same repository, 0.3 same branch, 0.2
/// scaled by recency of the candidate's last update.
fn context_score(candidate: &CanonicalIdentity, context: &BuildContext) -> f64 {
    let mut score = 0.0;
    if let (Some(reported), Some(stored)) = (&context.repository, &candidate.repository) {
        if reported == stored {
            score += 0.5;
        }
    }
    if let (Some(reported), Some(stored)) = (&context.branch, &candidate.last_branch) {
        if reported == stored {
            score += 0.3;
        }
    }
    let age_days = (Utc::now() - candidate.updated_at).num_seconds() as f64 / 86_400.0;
    let recency = (1.0 - age_days / RECENCY_WINDOW_DAYS).clamp(0.0, 1.0);
    score + 0.2 * recency
}

/// Classic two-row Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let substitution_cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}

/// `1 - distance / max(len)`, with two empty strings counting as identical.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AuthoringFamily, ExecutionStatus};
    use chrono::Duration;

    fn candidate(title: &str, path: &str) -> CanonicalIdentity {
        CanonicalIdentity::new("id", path, title)
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn test_levenshtein_similarity_bounds() {
        assert_eq!(levenshtein_similarity("", ""), 1.0);
        assert_eq!(levenshtein_similarity("abc", "abc"), 1.0);
        assert_eq!(levenshtein_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_name_score_tiers() {
        assert_eq!(name_score("Valid admin login", "Valid admin login"), 1.0);
        assert_eq!(name_score("valid admin login", "Valid Admin Login"), 0.95);
        assert_eq!(name_score("valid_admin_login", "Valid Admin Login"), 0.9);
        let fuzzy = name_score("valid admin signin", "Valid Admin Login");
        assert!(fuzzy > 0.0 && fuzzy < 0.9);
    }

    #[test]
    fn test_path_score_tiers() {
        assert_eq!(path_score(Some("tests/login.spec.ts"), "tests/login.spec.ts"), 1.0);
        assert_eq!(path_score(Some("e2e/login.spec.ts"), "tests/login.spec.ts"), 0.8);
        assert_eq!(path_score(Some("tests/login"), "tests/login.spec.ts"), 0.6);
        assert_eq!(path_score(None, "tests/login.spec.ts"), 0.0);
    }

    #[test]
    fn test_path_score_shared_segments_capped() {
        // Three of four segments shared but different filenames.
        let score = path_score(Some("src/auth/admin/login.ts"), "src/auth/admin/logout.ts");
        assert!(score <= 0.5);
        assert!(score > 0.0);
    }

    #[test]
    fn test_framework_floor_never_zero() {
        let result = ExecutionResult::new("t", ExecutionStatus::Passed);
        let mut stored = candidate("t", "p");
        stored.family = AuthoringFamily::Playwright;
        // Result has no family information at all: floor applies.
        assert_eq!(framework_score(&result, &stored), FRAMEWORK_FLOOR);
    }

    #[test]
    fn test_framework_compatible_pair() {
        let result = ExecutionResult::new("t", ExecutionStatus::Passed)
            .with_family(AuthoringFamily::Vitest);
        let mut stored = candidate("t", "p");
        stored.family = AuthoringFamily::Jest;
        assert_eq!(framework_score(&result, &stored), 0.7);

        stored.family = AuthoringFamily::Vitest;
        assert_eq!(framework_score(&result, &stored), 1.0);
    }

    #[test]
    fn test_content_score_requires_both_sides() {
        let silent = ExecutionResult::new("t", ExecutionStatus::Failed);
        let described = candidate("t", "p").with_description("Login");
        assert_eq!(content_score(&silent, &described), 0.0);

        let noisy = ExecutionResult::new("t", ExecutionStatus::Failed).with_error("login broke");
        let blank = candidate("t", "p");
        assert_eq!(content_score(&noisy, &blank), 0.0);
        assert!(content_score(&noisy, &described) > 0.0);
    }

    #[test]
    fn test_context_score_components() {
        let mut stored = candidate("t", "p");
        stored.repository = Some("web-app".to_string());
        stored.last_branch = Some("main".to_string());

        let context = BuildContext::for_repository("web-app").with_branch("main");
        let score = context_score(&stored, &context);
        // 0.5 repo + 0.3 branch + fresh recency 0.2.
        assert!((score - 1.0).abs() < 0.01);

        let elsewhere = BuildContext::for_repository("other-app");
        let score = context_score(&stored, &elsewhere);
        assert!(score <= 0.21);
    }

    #[test]
    fn test_recency_decays_over_window() {
        let mut fresh = candidate("t", "p");
        fresh.updated_at = Utc::now();
        let mut stale = candidate("t", "p");
        stale.updated_at = Utc::now() - Duration::days(60);

        let context = BuildContext::default();
        assert!(context_score(&fresh, &context) > context_score(&stale, &context));
        assert!(context_score(&stale, &context).abs() < 1e-9);
    }

    #[test]
    fn test_composite_weights_and_primary_signal() {
        let scorer = WeightedScorer::default();
        let result = ExecutionResult::new("valid_admin_login", ExecutionStatus::Passed)
            .with_file_path("e2e/login.spec.ts");
        let mut stored = candidate("Valid Admin Login", "tests/login.spec.ts");
        stored.family = AuthoringFamily::Playwright;
        stored.updated_at = Utc::now();

        let breakdown = scorer.score(&result, &stored, &BuildContext::default());
        assert!((breakdown.name_score - 0.9).abs() < 1e-9);
        assert!((breakdown.path_score - 0.8).abs() < 1e-9);
        assert_eq!(breakdown.primary, MatchSignal::Name);
        // 0.4*0.9 + 0.25*0.8 + 0.15*1.0 + 0 + 0.1*0.2 = 0.73
        assert!(breakdown.total >= 0.6, "expected fuzzy-acceptable total, got {}", breakdown.total);
    }

    #[test]
    fn test_same_title_disjoint_paths_different_repos_stays_below_threshold() {
        // Two results with the same title but no shared path segments and
        // different repositories must not clear the similarity threshold on
        // fuzzy evidence alone.
        let scorer = WeightedScorer::default();
        let result = ExecutionResult::new("handles empty cart", ExecutionStatus::Passed)
            .with_file_path("checkout/cart.test.ts");
        let mut stored = candidate("handles empty cart", "services/billing/spec.js");
        stored.repository = Some("billing-service".to_string());
        stored.family = AuthoringFamily::Jest;
        stored.updated_at = Utc::now();

        let context = BuildContext::for_repository("storefront");
        let breakdown = scorer.score(&result, &stored, &context);
        assert!(
            breakdown.total < 0.6,
            "spurious merge: total {} for disjoint-path cross-repo candidate",
            breakdown.total
        );
    }
}
