//! Execution results reported by CI integrations.
//!
//! An `ExecutionResult` is ephemeral input from the CI-ingestion collaborator.
//! Reported titles, paths, and suite labels are routinely rewritten between
//! authoring and reporting; duplicates across retries are expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::family::AuthoringFamily;

/// Outcome of one test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    Skipped,
    Blocked,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Blocked => "blocked",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "passed" | "pass" => Some(Self::Passed),
            "failed" | "fail" => Some(Self::Failed),
            "skipped" | "skip" | "pending" => Some(Self::Skipped),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// One reported test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Title as reported by the CI system.
    pub title: String,
    /// Reported file path; often partial or rewritten by the CI agent.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Reported suite/group label; groups may be flattened into one string.
    #[serde(default)]
    pub suite: Option<String>,
    /// Reported authoring family; usually absent for third-party results.
    #[serde(default)]
    pub family: Option<AuthoringFamily>,
    /// Execution outcome.
    pub status: ExecutionStatus,
    /// Wall-clock duration in milliseconds.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Error messages for failed executions.
    #[serde(default)]
    pub error_messages: Vec<String>,
    /// Tags forwarded by the reporter.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the execution completed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionResult {
    /// Create a result with the required fields.
    pub fn new(title: impl Into<String>, status: ExecutionStatus) -> Self {
        Self {
            title: title.into(),
            file_path: None,
            suite: None,
            family: None,
            status,
            duration_ms: None,
            error_messages: Vec::new(),
            tags: Vec::new(),
            completed_at: None,
        }
    }

    /// Set the reported file path.
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the reported suite label.
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = Some(suite.into());
        self
    }

    /// Set the reported authoring family.
    pub fn with_family(mut self, family: AuthoringFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Add an error message.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_messages.push(message.into());
        self
    }

    /// Infer an authoring family from surface characteristics of the report:
    /// the explicit family when present, else file-suffix and naming cues.
    ///
    /// Never returns an authoritative answer; the scorer treats the inferred
    /// family as a weak signal with a floor, so absence cannot veto a match.
    pub fn inferred_family(&self) -> AuthoringFamily {
        if let Some(family) = self.family {
            return family;
        }
        let path = self.file_path.as_deref().unwrap_or("").to_lowercase();
        if path.contains(".cy.") {
            return AuthoringFamily::Cypress;
        }
        if path.contains("playwright") || (path.contains("e2e") && path.contains(".spec.")) {
            return AuthoringFamily::Playwright;
        }
        if path.contains(".test.") {
            return AuthoringFamily::Jest;
        }
        if path.contains(".spec.") {
            return AuthoringFamily::Mocha;
        }
        AuthoringFamily::Generic
    }

    /// Joined error detail text, used for content scoring.
    pub fn detail_text(&self) -> Option<String> {
        if self.error_messages.is_empty() {
            None
        } else {
            Some(self.error_messages.join(" "))
        }
    }
}

/// Build/run context forwarded alongside a batch of execution results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildContext {
    /// Repository the run executed against.
    #[serde(default)]
    pub repository: Option<String>,
    /// Branch the run executed against.
    #[serde(default)]
    pub branch: Option<String>,
    /// CI provider or platform label (e.g. `github-actions`).
    #[serde(default)]
    pub platform: Option<String>,
}

impl BuildContext {
    /// Context scoped to one repository.
    pub fn for_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            branch: None,
            platform: None,
        }
    }

    /// Set the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_aliases() {
        assert_eq!(ExecutionStatus::from_str("PASS"), Some(ExecutionStatus::Passed));
        assert_eq!(ExecutionStatus::from_str("pending"), Some(ExecutionStatus::Skipped));
        assert_eq!(ExecutionStatus::from_str("errored"), None);
    }

    #[test]
    fn test_inferred_family_prefers_explicit() {
        let result = ExecutionResult::new("t", ExecutionStatus::Passed)
            .with_file_path("src/a.test.ts")
            .with_family(AuthoringFamily::Vitest);
        assert_eq!(result.inferred_family(), AuthoringFamily::Vitest);
    }

    #[test]
    fn test_inferred_family_from_path_cues() {
        let cy = ExecutionResult::new("t", ExecutionStatus::Passed).with_file_path("cypress/login.cy.ts");
        assert_eq!(cy.inferred_family(), AuthoringFamily::Cypress);

        let jest = ExecutionResult::new("t", ExecutionStatus::Passed).with_file_path("src/util.test.ts");
        assert_eq!(jest.inferred_family(), AuthoringFamily::Jest);

        let e2e = ExecutionResult::new("t", ExecutionStatus::Passed).with_file_path("e2e/login.spec.ts");
        assert_eq!(e2e.inferred_family(), AuthoringFamily::Playwright);

        let bare = ExecutionResult::new("t", ExecutionStatus::Passed);
        assert_eq!(bare.inferred_family(), AuthoringFamily::Generic);
    }

    #[test]
    fn test_detail_text_joins_errors() {
        let result = ExecutionResult::new("t", ExecutionStatus::Failed)
            .with_error("expected 200")
            .with_error("got 500");
        assert_eq!(result.detail_text().as_deref(), Some("expected 200 got 500"));

        let clean = ExecutionResult::new("t", ExecutionStatus::Passed);
        assert!(clean.detail_text().is_none());
    }
}
