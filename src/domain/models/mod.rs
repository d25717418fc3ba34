//! Domain models for the test identity & correlation engine.

pub mod config;
pub mod correlation;
pub mod declaration;
pub mod execution;
pub mod failure_pattern;
pub mod family;
pub mod identity;

pub use config::{Config, DatabaseConfig, EngineConfig, LoggingConfig};
pub use correlation::{
    Correlation, MatchSignal, ResolutionStrategy, ScoreBreakdown, ScoreWeights, ScoredCandidate,
};
pub use declaration::{FamilyAttributes, FileExtraction, FileMetadata, Modifier, SourceDeclaration};
pub use execution::{BuildContext, ExecutionResult, ExecutionStatus};
pub use failure_pattern::{CorrelatedFailure, FailurePattern, PatternKind};
pub use family::AuthoringFamily;
pub use identity::{CanonicalIdentity, TestKind, TestPriority};
