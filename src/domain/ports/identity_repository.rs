//! Storage port for canonical test identities.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AuthoringFamily, CanonicalIdentity, CorrelatedFailure, Correlation};

/// Repository trait for canonical-identity storage operations.
///
/// This is the engine's only outbound dependency. All retrieval methods return
/// an empty list rather than failing when nothing plausible is stored; storage
/// failures are propagated unmodified and never retried here (retry policy
/// belongs to the caller).
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Find identities whose title equals `title` exactly.
    async fn find_by_title(&self, title: &str) -> DomainResult<Vec<CanonicalIdentity>>;

    /// Find identities whose normalized title equals `normalized`.
    ///
    /// The caller supplies an already-normalized string; the adapter stores a
    /// normalized column beside the raw title so this is an equality lookup.
    async fn find_by_normalized_title(
        &self,
        normalized: &str,
    ) -> DomainResult<Vec<CanonicalIdentity>>;

    /// Find identities whose file path contains `fragment` (either direction
    /// of containment is checked by the retriever; the adapter matches
    /// substring containment of `fragment` in the stored path).
    async fn find_by_file_path_like(&self, fragment: &str)
        -> DomainResult<Vec<CanonicalIdentity>>;

    /// Find identities in one repository authored under one family.
    async fn find_by_repository_and_family(
        &self,
        repository: &str,
        family: AuthoringFamily,
    ) -> DomainResult<Vec<CanonicalIdentity>>;

    /// Insert the identity if its identifier is absent, otherwise refresh its
    /// metadata. The identifier itself is never changed.
    ///
    /// Must be atomic per identifier (insert-if-absent semantics) so that two
    /// concurrent correlations of the same never-before-seen test cannot
    /// create duplicate canonical records.
    async fn upsert_by_identifier(
        &self,
        identity: &CanonicalIdentity,
    ) -> DomainResult<CanonicalIdentity>;
}

/// Storage port for correlation history, consumed by the failure pattern
/// detector and the analytics surfaces.
#[async_trait]
pub trait CorrelationRepository: Send + Sync {
    /// Persist one correlation outcome.
    async fn record(&self, correlation: &Correlation) -> DomainResult<()>;

    /// Most recent correlated failures for one identity, newest first,
    /// bounded by `limit`.
    async fn recent_failures(
        &self,
        identity_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<CorrelatedFailure>>;
}
