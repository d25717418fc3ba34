//! Canonical test identity.
//!
//! A canonical identity is the single stable record representing one logical
//! test, independent of how any particular CI run reports it. The identifier
//! is a deterministic content hash of the (file path, title, group label)
//! triple and is immutable once assigned; metadata refreshes never change it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::family::AuthoringFamily;

/// Coarse classification of what a test exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Unit,
    Integration,
    EndToEnd,
    Functional,
}

impl Default for TestKind {
    fn default() -> Self {
        Self::Functional
    }
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::EndToEnd => "end_to_end",
            Self::Functional => "functional",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unit" => Some(Self::Unit),
            "integration" => Some(Self::Integration),
            "end_to_end" | "e2e" => Some(Self::EndToEnd),
            "functional" => Some(Self::Functional),
            _ => None,
        }
    }
}

/// Triage priority assigned to a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for TestPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl TestPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// The persisted record for one logical test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    /// Stable identifier: deterministic hash of (file path, title, group).
    /// Immutable once assigned.
    pub id: String,
    /// File path the test was declared (or first reported) in.
    pub file_path: String,
    /// Test title.
    pub title: String,
    /// Free-text description; for statically extracted tests this carries the
    /// enclosing group label so suite-based matching has something to read.
    pub description: String,
    /// Categorization tags.
    pub tags: Vec<String>,
    /// Triage priority.
    pub priority: TestPriority,
    /// Owning engineer or team, when known.
    pub owner: Option<String>,
    /// Repository the test belongs to, when known.
    pub repository: Option<String>,
    /// Branch the test was last seen executing on, when known.
    pub last_branch: Option<String>,
    /// Test-kind classification.
    pub kind: TestKind,
    /// Authoring family that produced the declaration.
    pub family: AuthoringFamily,
    /// True when the identity was first observed via an execution result
    /// rather than static extraction.
    pub auto_created: bool,
    /// Last metadata refresh.
    pub updated_at: DateTime<Utc>,
}

impl CanonicalIdentity {
    /// Create an identity with the required fields.
    pub fn new(
        id: impl Into<String>,
        file_path: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            priority: TestPriority::default(),
            owner: None,
            repository: None,
            last_branch: None,
            kind: TestKind::default(),
            family: AuthoringFamily::default(),
            auto_created: false,
            updated_at: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the authoring family.
    pub fn with_family(mut self, family: AuthoringFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the test kind.
    pub fn with_kind(mut self, kind: TestKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the owning repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Mark the identity as created from an execution result.
    pub fn with_auto_created(mut self, auto_created: bool) -> Self {
        self.auto_created = auto_created;
        self
    }

    /// Validate invariants: id, file path, and title non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("identity id cannot be empty".to_string());
        }
        if self.file_path.trim().is_empty() {
            return Err("identity file path cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("identity title cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_validation() {
        let identity = CanonicalIdentity::new("abc123", "tests/login.spec.ts", "Valid admin login");
        assert!(identity.validate().is_ok());

        let no_id = CanonicalIdentity::new("", "tests/login.spec.ts", "Valid admin login");
        assert!(no_id.validate().is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(TestKind::from_str("e2e"), Some(TestKind::EndToEnd));
        assert_eq!(TestKind::from_str(TestKind::Unit.as_str()), Some(TestKind::Unit));
        assert_eq!(TestKind::from_str("manual"), None);
    }

    #[test]
    fn test_builder_defaults() {
        let identity = CanonicalIdentity::new("id", "path", "title");
        assert_eq!(identity.priority, TestPriority::Medium);
        assert_eq!(identity.kind, TestKind::Functional);
        assert!(!identity.auto_created);
        assert!(identity.repository.is_none());
    }
}
