//! Authoring family classification.
//!
//! An authoring family is a structural category of test-declaration syntax
//! (grouping + declaration conventions). Families are detected heuristically
//! from file content; detection can be wrong for hand-written or templated
//! files and that is an accepted limitation.

use serde::{Deserialize, Serialize};

/// Structural test-authoring conventions recognized by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthoringFamily {
    /// Browser-driven end-to-end style (`test(...)` with page fixtures,
    /// `test.describe` grouping, browser project lists).
    Playwright,
    /// Command-style end-to-end (`cy.*` command chains inside `it(...)`).
    Cypress,
    /// Unit-test style (`describe`/`it`/`test` with `expect` assertions).
    Jest,
    /// Concurrent unit-test style (`test.concurrent`, vitest imports).
    Vitest,
    /// Suite-style (`suite`/`describe` blocks, `this.timeout` idiom).
    Mocha,
    /// No recognizable convention; permissive fallback patterns apply.
    Generic,
}

impl Default for AuthoringFamily {
    fn default() -> Self {
        Self::Generic
    }
}

impl AuthoringFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playwright => "playwright",
            Self::Cypress => "cypress",
            Self::Jest => "jest",
            Self::Vitest => "vitest",
            Self::Mocha => "mocha",
            Self::Generic => "generic",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "playwright" => Some(Self::Playwright),
            "cypress" => Some(Self::Cypress),
            "jest" => Some(Self::Jest),
            "vitest" => Some(Self::Vitest),
            "mocha" => Some(Self::Mocha),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }

    /// Default test-kind classification for identities declared under this
    /// family.
    pub fn default_kind(&self) -> super::identity::TestKind {
        use super::identity::TestKind;
        match self {
            Self::Playwright | Self::Cypress => TestKind::EndToEnd,
            Self::Jest | Self::Vitest => TestKind::Unit,
            Self::Mocha => TestKind::Integration,
            Self::Generic => TestKind::Functional,
        }
    }

    /// Whether two families share enough declaration syntax that a result
    /// reported under one plausibly belongs to a test authored under the other.
    ///
    /// Jest, Vitest, and Mocha all use `describe`/`it` grouping; Cypress is
    /// built on Mocha's runner.
    pub fn shares_declaration_syntax(&self, other: Self) -> bool {
        use AuthoringFamily::{Cypress, Jest, Mocha, Vitest};
        if *self == other {
            return true;
        }
        matches!(
            (*self, other),
            (Jest, Vitest)
                | (Vitest, Jest)
                | (Jest, Mocha)
                | (Mocha, Jest)
                | (Vitest, Mocha)
                | (Mocha, Vitest)
                | (Cypress, Mocha)
                | (Mocha, Cypress)
        )
    }
}

impl std::fmt::Display for AuthoringFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_round_trip() {
        for family in [
            AuthoringFamily::Playwright,
            AuthoringFamily::Cypress,
            AuthoringFamily::Jest,
            AuthoringFamily::Vitest,
            AuthoringFamily::Mocha,
            AuthoringFamily::Generic,
        ] {
            assert_eq!(AuthoringFamily::from_str(family.as_str()), Some(family));
        }
        assert_eq!(AuthoringFamily::from_str("junit"), None);
    }

    #[test]
    fn test_syntax_compatibility_is_symmetric() {
        assert!(AuthoringFamily::Jest.shares_declaration_syntax(AuthoringFamily::Vitest));
        assert!(AuthoringFamily::Vitest.shares_declaration_syntax(AuthoringFamily::Jest));
        assert!(AuthoringFamily::Cypress.shares_declaration_syntax(AuthoringFamily::Mocha));
        assert!(!AuthoringFamily::Playwright.shares_declaration_syntax(AuthoringFamily::Jest));
    }

    #[test]
    fn test_family_is_self_compatible() {
        assert!(AuthoringFamily::Generic.shares_declaration_syntax(AuthoringFamily::Generic));
    }
}
