//! Candidate retrieval ahead of scoring.
//!
//! Pulls plausible canonical-identity candidates from storage through several
//! independent lookup paths, dedupes them by identifier, and remembers which
//! path surfaced each candidate for diagnostics. Returns an empty list, not
//! an error, when storage holds nothing plausible.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{BuildContext, CanonicalIdentity, ExecutionResult};
use crate::domain::ports::IdentityRepository;
use crate::services::normalizer::{name_tokens, normalize, normalize_path};

/// Which retrieval path found a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Exact reported-title equality.
    ExactTitle,
    /// Normalized-title equality.
    NormalizedTitle,
    /// File-path fragment containment.
    PathFragment,
    /// Same repository and authoring family.
    RepositoryPool,
    /// Shares at least one normalized name token.
    TokenOverlap,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactTitle => "exact_title",
            Self::NormalizedTitle => "normalized_title",
            Self::PathFragment => "path_fragment",
            Self::RepositoryPool => "repository_pool",
            Self::TokenOverlap => "token_overlap",
        }
    }
}

/// A deduplicated candidate with the union of its retrieval sources.
#[derive(Debug, Clone)]
pub struct RetrievedCandidate {
    /// The stored identity.
    pub identity: CanonicalIdentity,
    /// Every retrieval path that surfaced it.
    pub sources: HashSet<CandidateSource>,
}

/// Retrieves correlation candidates from the storage collaborator.
pub struct CandidateRetriever<R> {
    repository: Arc<R>,
}

impl<R: IdentityRepository> CandidateRetriever<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Retrieve all plausible candidates for one execution result.
    ///
    /// The repository+family pool is admitted through a token-overlap
    /// prefilter so fuzzy scoring never walks the whole corpus; candidates
    /// found by the direct lookups are admitted unconditionally.
    pub async fn retrieve(
        &self,
        result: &ExecutionResult,
        context: &BuildContext,
    ) -> DomainResult<Vec<RetrievedCandidate>> {
        let mut pool: Vec<RetrievedCandidate> = Vec::new();

        for identity in self.repository.find_by_title(&result.title).await? {
            admit(&mut pool, identity, CandidateSource::ExactTitle);
        }

        let normalized = normalize(&result.title);
        if !normalized.is_empty() {
            for identity in self.repository.find_by_normalized_title(&normalized).await? {
                admit(&mut pool, identity, CandidateSource::NormalizedTitle);
            }
        }

        if let Some(fragment) = path_fragment(result) {
            for identity in self.repository.find_by_file_path_like(&fragment).await? {
                admit(&mut pool, identity, CandidateSource::PathFragment);
            }
        }

        if let Some(repository_name) = &context.repository {
            let family = result.inferred_family();
            let tokens: HashSet<String> = name_tokens(&result.title).into_iter().collect();
            for identity in self
                .repository
                .find_by_repository_and_family(repository_name, family)
                .await?
            {
                let overlaps = !tokens.is_empty()
                    && name_tokens(&identity.title)
                        .iter()
                        .any(|token| tokens.contains(token));
                if overlaps {
                    admit(&mut pool, identity.clone(), CandidateSource::TokenOverlap);
                }
                admit_if_present(&mut pool, &identity, CandidateSource::RepositoryPool);
            }
        }

        debug!(
            title = result.title.as_str(),
            candidates = pool.len(),
            "retrieved correlation candidates"
        );
        Ok(pool)
    }
}

/// Filename of the reported path, used as the path-containment probe.
fn path_fragment(result: &ExecutionResult) -> Option<String> {
    let path = normalize_path(result.file_path.as_deref()?);
    let fragment = path.rsplit('/').next().unwrap_or(&path);
    if fragment.is_empty() {
        None
    } else {
        Some(fragment.to_string())
    }
}

fn admit(pool: &mut Vec<RetrievedCandidate>, identity: CanonicalIdentity, source: CandidateSource) {
    if let Some(existing) = pool.iter_mut().find(|c| c.identity.id == identity.id) {
        existing.sources.insert(source);
    } else {
        pool.push(RetrievedCandidate {
            identity,
            sources: HashSet::from([source]),
        });
    }
}

/// Tag an already-admitted candidate without admitting new ones; keeps the
/// repository pool from flooding the scored set past the token prefilter.
fn admit_if_present(
    pool: &mut [RetrievedCandidate],
    identity: &CanonicalIdentity,
    source: CandidateSource,
) {
    if let Some(existing) = pool.iter_mut().find(|c| c.identity.id == identity.id) {
        existing.sources.insert(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ExecutionStatus;

    #[test]
    fn test_path_fragment_is_filename() {
        let result = ExecutionResult::new("t", ExecutionStatus::Passed)
            .with_file_path("app/e2e/login.spec.ts");
        assert_eq!(path_fragment(&result).as_deref(), Some("login.spec.ts"));

        let bare = ExecutionResult::new("t", ExecutionStatus::Passed);
        assert!(path_fragment(&bare).is_none());
    }

    #[test]
    fn test_admit_dedupes_and_unions_sources() {
        let mut pool = Vec::new();
        let identity = CanonicalIdentity::new("same-id", "p", "t");
        admit(&mut pool, identity.clone(), CandidateSource::ExactTitle);
        admit(&mut pool, identity, CandidateSource::NormalizedTitle);

        assert_eq!(pool.len(), 1);
        assert!(pool[0].sources.contains(&CandidateSource::ExactTitle));
        assert!(pool[0].sources.contains(&CandidateSource::NormalizedTitle));
    }

    #[test]
    fn test_admit_if_present_does_not_admit() {
        let mut pool = Vec::new();
        let identity = CanonicalIdentity::new("id", "p", "t");
        admit_if_present(&mut pool, &identity, CandidateSource::RepositoryPool);
        assert!(pool.is_empty());
    }
}
