//! Testloom - Test Identity & Correlation Engine
//!
//! Testloom derives canonical, stable identities for tests declared in source
//! code and matches execution results reported by heterogeneous CI systems
//! back to those identities, with auditable confidence and without
//! false-positive merges.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure domain models and port traits
//! - **Service Layer** (`services`): The engine proper — normalization,
//!   declaration extraction, identity generation, candidate retrieval,
//!   weighted scoring, correlation, and failure pattern detection
//! - **Adapter Layer** (`adapters`): SQLite implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use testloom::domain::models::{BuildContext, EngineConfig, ExecutionResult, ExecutionStatus};
//! use testloom::services::CorrelationEngine;
//!
//! # async fn run(repository: Arc<impl testloom::domain::ports::IdentityRepository>) {
//! let engine = CorrelationEngine::new(repository, EngineConfig::default());
//! let result = ExecutionResult::new("valid admin login", ExecutionStatus::Passed)
//!     .with_file_path("tests/login.spec.ts");
//! let correlation = engine.correlate(result, &BuildContext::default()).await.unwrap();
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AuthoringFamily, BuildContext, CanonicalIdentity, Config, Correlation, EngineConfig,
    ExecutionResult, ExecutionStatus, FailurePattern, PatternKind, ResolutionStrategy,
    SourceDeclaration,
};
pub use domain::ports::{CorrelationRepository, IdentityRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CorrelationEngine, DeclarationExtractor, FailurePatternDetector};
