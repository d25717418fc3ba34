//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters
//! must implement:
//! - `IdentityRepository`: storage operations for canonical test identities
//! - `CorrelationRepository`: correlation history for pattern analysis
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod identity_repository;

pub use identity_repository::{CorrelationRepository, IdentityRepository};
