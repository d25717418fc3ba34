//! Correlation engine: strategy ladder, statistics, and result cache.
//!
//! Strategies are tried in a fixed preference order, stopping at the first
//! success: direct identifier, path+name, name+suite, weighted fuzzy, and
//! finally fallback creation. A result that retrieved candidates but cleared
//! no strategy is returned explicitly unmatched, never coerced into a
//! low-confidence match.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BuildContext, CanonicalIdentity, Correlation, EngineConfig, ExecutionResult, ResolutionStrategy,
    ScoreBreakdown, ScoredCandidate,
};
use crate::domain::ports::IdentityRepository;
use crate::services::identity::{id_from_execution, identity_from_execution};
use crate::services::normalizer::normalize_path;
use crate::services::retriever::{CandidateRetriever, RetrievedCandidate};
use crate::services::scorer::WeightedScorer;

/// Confidence attached to each resolution tier.
const DIRECT_ID_CONFIDENCE: f64 = 1.0;
const PATH_NAME_CONFIDENCE: f64 = 0.95;
const PATH_NAME_DISAMBIGUATED_CONFIDENCE: f64 = 0.85;
const NAME_SUITE_CONFIDENCE: f64 = 0.8;
const CREATED_CONFIDENCE: f64 = 0.6;

/// Exact running counters over one engine's lifetime.
#[derive(Debug, Default)]
pub struct CorrelationStats {
    direct: AtomicU64,
    fuzzy: AtomicU64,
    created: AtomicU64,
    failed: AtomicU64,
    total: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    /// Direct-identifier matches.
    pub direct: u64,
    /// Matches through path/name/suite/fuzzy strategies.
    pub fuzzy: u64,
    /// Fallback creations.
    pub created: u64,
    /// Explicitly unmatched outcomes.
    pub failed: u64,
    /// All correlations attempted.
    pub total: u64,
}

impl CorrelationStats {
    fn record(&self, strategy: ResolutionStrategy) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let bucket = match strategy {
            ResolutionStrategy::DirectId => &self.direct,
            ResolutionStrategy::PathAndName
            | ResolutionStrategy::NameAndSuite
            | ResolutionStrategy::Fuzzy => &self.fuzzy,
            ResolutionStrategy::CreatedNew => &self.created,
            ResolutionStrategy::None => &self.failed,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            direct: self.direct.load(Ordering::Relaxed),
            fuzzy: self.fuzzy.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}

/// Cache key: repeat reports of the same test within a run hash to the same
/// entry regardless of which result instance carried them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    platform: String,
    file_path: String,
    title: String,
    suite: String,
}

impl CacheKey {
    fn for_result(result: &ExecutionResult, context: &BuildContext) -> Self {
        let platform = result
            .family
            .map(|f| f.as_str().to_string())
            .or_else(|| context.platform.clone())
            .unwrap_or_default();
        Self {
            platform,
            file_path: normalize_path(result.file_path.as_deref().unwrap_or("")),
            title: result.title.clone(),
            suite: result.suite.clone().unwrap_or_default(),
        }
    }
}

/// A correlation outcome stripped of the triggering result, so a cache hit
/// can be replayed onto a fresh result instance.
#[derive(Debug, Clone)]
struct CachedOutcome {
    identity: CanonicalIdentity,
    confidence: f64,
    strategy: ResolutionStrategy,
    breakdown: ScoreBreakdown,
    alternatives: Vec<ScoredCandidate>,
}

/// Insertion-ordered bounded cache; no TTL beyond process lifetime.
#[derive(Debug, Default)]
struct ResultCache {
    entries: HashMap<CacheKey, CachedOutcome>,
    order: std::collections::VecDeque<CacheKey>,
}

impl ResultCache {
    fn get(&self, key: &CacheKey) -> Option<CachedOutcome> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, outcome: CachedOutcome, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, outcome);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Correlates execution results to canonical identities.
pub struct CorrelationEngine<R> {
    repository: Arc<R>,
    retriever: CandidateRetriever<R>,
    scorer: WeightedScorer,
    config: EngineConfig,
    cache: Mutex<ResultCache>,
    stats: CorrelationStats,
}

impl<R: IdentityRepository> CorrelationEngine<R> {
    /// Build an engine over one storage collaborator.
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        Self {
            retriever: CandidateRetriever::new(Arc::clone(&repository)),
            scorer: WeightedScorer::new(config.weights.clone()),
            repository,
            config,
            cache: Mutex::new(ResultCache::default()),
            stats: CorrelationStats::default(),
        }
    }

    /// Correlate one execution result.
    ///
    /// The only suspension points are candidate retrieval and (for fallback
    /// creation) the upsert; everything else is synchronous text scoring.
    pub async fn correlate(
        &self,
        result: ExecutionResult,
        context: &BuildContext,
    ) -> DomainResult<Correlation> {
        let key = CacheKey::for_result(&result, context);
        if let Some(hit) = self.lock_cache().get(&key) {
            debug!(title = result.title.as_str(), strategy = %hit.strategy, "correlation cache hit");
            self.stats.record(hit.strategy);
            return Ok(Correlation {
                result,
                identity: Some(hit.identity),
                confidence: hit.confidence,
                strategy: hit.strategy,
                breakdown: hit.breakdown,
                alternatives: hit.alternatives,
            });
        }

        let candidates = self.retriever.retrieve(&result, context).await?;
        let correlation = if candidates.is_empty() {
            self.create_fallback(result, context).await?
        } else {
            self.resolve(result, context, candidates)
        };

        self.stats.record(correlation.strategy);
        if correlation.confidence >= self.config.cache_confidence_floor {
            if let Some(identity) = &correlation.identity {
                self.lock_cache().insert(
                    key,
                    CachedOutcome {
                        identity: identity.clone(),
                        confidence: correlation.confidence,
                        strategy: correlation.strategy,
                        breakdown: correlation.breakdown.clone(),
                        alternatives: correlation.alternatives.clone(),
                    },
                    self.config.cache_capacity,
                );
            }
        }
        Ok(correlation)
    }

    /// Drop all cached outcomes; callers do this between analysis batches.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Copy of the running counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Apply the strategy ladder over a non-empty candidate set.
    fn resolve(
        &self,
        result: ExecutionResult,
        context: &BuildContext,
        candidates: Vec<RetrievedCandidate>,
    ) -> Correlation {
        // Rank every candidate once; decisions below never depend on these
        // scores until the fuzzy tier, but runner-up audit entries do.
        let ranked = self.rank(&result, context, &candidates);

        let execution_id = id_from_execution(&result);
        if let Some(hit) = candidates.iter().find(|c| c.identity.id == execution_id) {
            let identity = hit.identity.clone();
            debug!(id = identity.id.as_str(), "direct identifier match");
            return build_correlation(
                result,
                Some(identity.clone()),
                DIRECT_ID_CONFIDENCE,
                ResolutionStrategy::DirectId,
                breakdown_for(&ranked, &identity.id),
                alternatives(&ranked, Some(identity.id.as_str())),
            );
        }

        if let Some((identity, disambiguated)) = self.match_path_and_name(&result, &candidates) {
            let confidence = if disambiguated {
                PATH_NAME_DISAMBIGUATED_CONFIDENCE
            } else {
                PATH_NAME_CONFIDENCE
            };
            return build_correlation(
                result,
                Some(identity.clone()),
                confidence,
                ResolutionStrategy::PathAndName,
                breakdown_for(&ranked, &identity.id),
                alternatives(&ranked, Some(identity.id.as_str())),
            );
        }

        if let Some(identity) = match_name_and_suite(&result, &candidates) {
            return build_correlation(
                result,
                Some(identity.clone()),
                NAME_SUITE_CONFIDENCE,
                ResolutionStrategy::NameAndSuite,
                breakdown_for(&ranked, &identity.id),
                alternatives(&ranked, Some(identity.id.as_str())),
            );
        }

        if let Some(best) = ranked.first() {
            if best.breakdown.total >= self.config.similarity_threshold {
                let identity = best.identity.clone();
                return build_correlation(
                    result,
                    Some(identity.clone()),
                    best.breakdown.total,
                    ResolutionStrategy::Fuzzy,
                    best.breakdown.clone(),
                    alternatives(&ranked, Some(identity.id.as_str())),
                );
            }
        }

        // Candidates existed but none cleared the threshold: explicitly
        // unmatched, with the best score reported for the audit trail.
        let best_breakdown = ranked
            .first()
            .map(|r| r.breakdown.clone())
            .unwrap_or_default();
        let best_confidence = best_breakdown.total;
        warn!(
            title = result.title.as_str(),
            best = best_confidence,
            "no candidate cleared the similarity threshold"
        );
        build_correlation(
            result,
            None,
            best_confidence,
            ResolutionStrategy::None,
            best_breakdown,
            alternatives(&ranked, None),
        )
    }

    /// Fallback creation: synthesize, persist through the collaborator's
    /// insert-if-absent upsert, and report at the threshold confidence.
    async fn create_fallback(
        &self,
        result: ExecutionResult,
        context: &BuildContext,
    ) -> DomainResult<Correlation> {
        let mut identity = identity_from_execution(&result, context);
        identity.last_branch = context.branch.clone();
        let persisted = self.repository.upsert_by_identifier(&identity).await?;
        info!(
            id = persisted.id.as_str(),
            title = persisted.title.as_str(),
            "created canonical identity from execution result"
        );
        Ok(build_correlation(
            result,
            Some(persisted),
            CREATED_CONFIDENCE,
            ResolutionStrategy::CreatedNew,
            ScoreBreakdown::default(),
            Vec::new(),
        ))
    }

    /// Score all candidates (bounded by configuration), highest total first.
    fn rank(
        &self,
        result: &ExecutionResult,
        context: &BuildContext,
        candidates: &[RetrievedCandidate],
    ) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .take(self.config.max_scored_candidates)
            .map(|candidate| RankedCandidate {
                breakdown: self.scorer.score(result, &candidate.identity, context),
                identity: candidate.identity.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.breakdown
                .total
                .partial_cmp(&a.breakdown.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Path+name tier: normalized path and exact title both match. A unique
    /// survivor wins outright; several survivors are disambiguated by group
    /// label containment, then family agreement, then recency.
    fn match_path_and_name<'a>(
        &self,
        result: &ExecutionResult,
        candidates: &'a [RetrievedCandidate],
    ) -> Option<(&'a CanonicalIdentity, bool)> {
        let reported_path = normalize_path(result.file_path.as_deref()?);
        if reported_path.is_empty() {
            return None;
        }
        let matching: Vec<&CanonicalIdentity> = candidates
            .iter()
            .map(|c| &c.identity)
            .filter(|identity| {
                identity.title == result.title
                    && normalize_path(&identity.file_path) == reported_path
            })
            .collect();

        match matching.as_slice() {
            [] => None,
            [only] => Some((only, false)),
            several => {
                let suite = result.suite.as_deref().unwrap_or("").to_lowercase();
                let chosen = several
                    .iter()
                    .find(|identity| {
                        !identity.description.is_empty()
                            && suite.contains(&identity.description.to_lowercase())
                    })
                    .or_else(|| {
                        let inferred = result.inferred_family();
                        several.iter().find(|identity| identity.family == inferred)
                    })
                    .or_else(|| several.iter().max_by_key(|identity| identity.updated_at));
                chosen.map(|identity| (*identity, true))
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_correlation(
    result: ExecutionResult,
    identity: Option<CanonicalIdentity>,
    confidence: f64,
    strategy: ResolutionStrategy,
    breakdown: ScoreBreakdown,
    alternatives: Vec<ScoredCandidate>,
) -> Correlation {
    Correlation {
        result,
        identity,
        confidence,
        strategy,
        breakdown,
        alternatives,
    }
}

/// A scored candidate paired with its full breakdown.
struct RankedCandidate {
    identity: CanonicalIdentity,
    breakdown: ScoreBreakdown,
}

/// Name+suite tier: exact title plus description containing the reported
/// suite, case-insensitively. Recency breaks ties.
fn match_name_and_suite<'a>(
    result: &ExecutionResult,
    candidates: &'a [RetrievedCandidate],
) -> Option<&'a CanonicalIdentity> {
    let suite = result.suite.as_deref()?.to_lowercase();
    if suite.is_empty() {
        return None;
    }
    candidates
        .iter()
        .map(|c| &c.identity)
        .filter(|identity| {
            identity.title == result.title
                && !identity.description.is_empty()
                && identity.description.to_lowercase().contains(&suite)
        })
        .max_by_key(|identity| identity.updated_at)
}

/// Breakdown of one specific candidate from the ranked list.
fn breakdown_for(ranked: &[RankedCandidate], id: &str) -> ScoreBreakdown {
    ranked
        .iter()
        .find(|r| r.identity.id == id)
        .map(|r| r.breakdown.clone())
        .unwrap_or_default()
}

/// Top two runner-up candidates (excluding the winner) for the audit trail.
fn alternatives(ranked: &[RankedCandidate], winner: Option<&str>) -> Vec<ScoredCandidate> {
    ranked
        .iter()
        .filter(|r| winner != Some(r.identity.id.as_str()))
        .take(2)
        .map(|r| ScoredCandidate {
            identity: r.identity.clone(),
            score: r.breakdown.total,
        })
        .collect()
}
