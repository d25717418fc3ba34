//! Declared-test facts extracted from one source file.
//!
//! `SourceDeclaration` is ephemeral: it exists between a parse call and the
//! identity-generation step, then is discarded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::family::AuthoringFamily;

/// Modifier suffix attached to a test declaration (`.only`, `.skip`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Only,
    Skip,
    Todo,
    Concurrent,
    Fixme,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Only => "only",
            Self::Skip => "skip",
            Self::Todo => "todo",
            Self::Concurrent => "concurrent",
            Self::Fixme => "fixme",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "only" => Some(Self::Only),
            "skip" => Some(Self::Skip),
            "todo" => Some(Self::Todo),
            "concurrent" => Some(Self::Concurrent),
            "fixme" => Some(Self::Fixme),
            _ => None,
        }
    }
}

/// Family-specific attributes scanned from a bounded window around a
/// declaration. All attributes are optional; absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyAttributes {
    /// Target browser/engine names (e.g. `chromium`, `firefox`, `webkit`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub browsers: Vec<String>,
    /// Assertion call names found in the declaration body window.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<String>,
    /// Custom command identifiers (e.g. `cy.login`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// Declared timeout in milliseconds, when a numeric literal is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl FamilyAttributes {
    pub fn is_empty(&self) -> bool {
        self.browsers.is_empty()
            && self.assertions.is_empty()
            && self.commands.is_empty()
            && self.timeout_ms.is_none()
    }
}

/// One declared test located in a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDeclaration {
    /// Authoring family the declaration was extracted under.
    pub family: AuthoringFamily,
    /// Test title exactly as written by the author.
    pub title: String,
    /// Owning file path.
    pub file_path: String,
    /// 1-based line number of the declaration.
    pub line: u32,
    /// Nearest enclosing group label, if any.
    pub group: Option<String>,
    /// Whether the test body is declared asynchronous.
    pub is_async: bool,
    /// Modifier suffixes attached to the declaration call.
    pub modifiers: HashSet<Modifier>,
    /// Family-specific attributes from the surrounding window.
    pub attributes: FamilyAttributes,
}

impl SourceDeclaration {
    /// Create a declaration with the required fields; optional facts are
    /// filled in with builder methods.
    pub fn new(
        family: AuthoringFamily,
        title: impl Into<String>,
        file_path: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            family,
            title: title.into(),
            file_path: file_path.into(),
            line,
            group: None,
            is_async: false,
            modifiers: HashSet::new(),
            attributes: FamilyAttributes::default(),
        }
    }

    /// Set the enclosing group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mark the declaration asynchronous.
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Attach a modifier.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    /// Validate invariants: title and file path non-empty, line >= 1.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("declaration title cannot be empty".to_string());
        }
        if self.file_path.trim().is_empty() {
            return Err("declaration file path cannot be empty".to_string());
        }
        if self.line == 0 {
            return Err("declaration line number must be >= 1".to_string());
        }
        Ok(())
    }
}

/// File-level metadata produced alongside the declarations of one parse call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Detected (or hinted) authoring family for the whole file.
    pub family: AuthoringFamily,
    /// Path of the scanned file.
    pub file_path: String,
    /// Number of declarations extracted.
    pub declaration_count: usize,
    /// Number of grouping-label declarations found.
    pub group_count: usize,
    /// Number of malformed declaration sites skipped.
    pub skipped_count: usize,
}

/// Result of extracting one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Declarations in source order.
    pub declarations: Vec<SourceDeclaration>,
    /// File-level metadata.
    pub metadata: FileMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_validation() {
        let decl = SourceDeclaration::new(AuthoringFamily::Jest, "adds two numbers", "src/math.test.ts", 12);
        assert!(decl.validate().is_ok());

        let empty_title = SourceDeclaration::new(AuthoringFamily::Jest, "  ", "src/math.test.ts", 12);
        assert!(empty_title.validate().is_err());

        let zero_line = SourceDeclaration::new(AuthoringFamily::Jest, "adds", "src/math.test.ts", 0);
        assert!(zero_line.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let decl = SourceDeclaration::new(AuthoringFamily::Playwright, "login works", "e2e/login.spec.ts", 8)
            .with_group("Login")
            .with_async(true)
            .with_modifier(Modifier::Only);

        assert_eq!(decl.group.as_deref(), Some("Login"));
        assert!(decl.is_async);
        assert!(decl.modifiers.contains(&Modifier::Only));
    }

    #[test]
    fn test_attributes_default_empty() {
        let attrs = FamilyAttributes::default();
        assert!(attrs.is_empty());
    }
}
