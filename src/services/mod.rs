//! Engine services: normalization, extraction, identity, retrieval, scoring,
//! correlation, and failure pattern detection.

pub mod engine;
pub mod extractor;
pub mod failure_patterns;
pub mod identity;
pub mod normalizer;
pub mod retriever;
pub mod scorer;

pub use engine::{CorrelationEngine, StatsSnapshot};
pub use extractor::DeclarationExtractor;
pub use failure_patterns::FailurePatternDetector;
pub use retriever::{CandidateRetriever, CandidateSource, RetrievedCandidate};
pub use scorer::WeightedScorer;
