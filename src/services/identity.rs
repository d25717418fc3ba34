//! Canonical identifier generation.
//!
//! Identifiers are BLAKE3 content hashes over a canonicalized
//! (file path, title, group label) triple. The static variant hashes the raw
//! title to preserve author intent in the stored record; the execution
//! variant normalizes title and suite first, because reported names are
//! unreliable. Both are pure and deterministic: identical triples always
//! yield identical identifiers.

use crate::domain::models::{
    BuildContext, CanonicalIdentity, ExecutionResult, SourceDeclaration,
};
use crate::services::normalizer::{normalize, normalize_path};

/// File path recorded for identities created from results that reported none.
const UNREPORTED_PATH: &str = "unknown";

/// Field separator inside the hashed canonical string. A control character
/// keeps `("a", "b c")` and `("a b", "c")` from colliding.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Identifier for a statically extracted declaration triple.
pub fn id_from_triple(file_path: &str, title: &str, group: Option<&str>) -> String {
    hash_triple(&normalize_path(file_path), title, group.unwrap_or(""))
}

/// Identifier for an execution-derived triple. Title and suite are
/// normalized before hashing; the reported path is canonicalized the same
/// way as the static variant.
pub fn id_from_execution(result: &ExecutionResult) -> String {
    hash_triple(
        &normalize_path(result.file_path.as_deref().unwrap_or("")),
        &normalize(&result.title),
        &normalize(result.suite.as_deref().unwrap_or("")),
    )
}

fn hash_triple(path: &str, title: &str, group: &str) -> String {
    let mut canonical = String::with_capacity(path.len() + title.len() + group.len() + 2);
    canonical.push_str(path);
    canonical.push(FIELD_SEPARATOR);
    canonical.push_str(title);
    canonical.push(FIELD_SEPARATOR);
    canonical.push_str(group);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Build the canonical record for one statically extracted declaration.
///
/// The enclosing group label is carried in the description so suite-based
/// matching has something to compare against.
pub fn identity_from_declaration(
    declaration: &SourceDeclaration,
    repository: Option<&str>,
) -> CanonicalIdentity {
    let mut identity = CanonicalIdentity::new(
        id_from_triple(
            &declaration.file_path,
            &declaration.title,
            declaration.group.as_deref(),
        ),
        normalize_path(&declaration.file_path),
        declaration.title.clone(),
    )
    .with_family(declaration.family)
    .with_kind(declaration.family.default_kind())
    .with_description(declaration.group.clone().unwrap_or_default());

    for modifier in &declaration.modifiers {
        identity.tags.push(modifier.as_str().to_string());
    }
    if let Some(repository) = repository {
        identity.repository = Some(repository.to_string());
    }
    identity
}

/// Synthesize a new canonical record from an execution result that matched
/// nothing in storage (fallback creation).
pub fn identity_from_execution(
    result: &ExecutionResult,
    context: &BuildContext,
) -> CanonicalIdentity {
    let file_path = result
        .file_path
        .as_deref()
        .map(normalize_path)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| UNREPORTED_PATH.to_string());
    let family = result.inferred_family();

    let mut identity = CanonicalIdentity::new(id_from_execution(result), file_path, result.title.clone())
        .with_family(family)
        .with_kind(family.default_kind())
        .with_description(result.suite.clone().unwrap_or_default())
        .with_auto_created(true);

    identity.tags = result.tags.clone();
    identity.repository = context.repository.clone();
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AuthoringFamily, ExecutionStatus, Modifier, TestKind};
    use proptest::prelude::*;

    #[test]
    fn test_static_id_is_deterministic() {
        let a = id_from_triple("tests/login.spec.ts", "Valid admin login", Some("Login"));
        let b = id_from_triple("tests/login.spec.ts", "Valid admin login", Some("Login"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_triples_get_distinct_ids() {
        let base = id_from_triple("tests/login.spec.ts", "Valid admin login", Some("Login"));
        assert_ne!(base, id_from_triple("tests/login.spec.ts", "Valid admin login", Some("Signup")));
        assert_ne!(base, id_from_triple("tests/login.spec.ts", "Invalid admin login", Some("Login")));
        assert_ne!(base, id_from_triple("tests/logout.spec.ts", "Valid admin login", Some("Login")));
    }

    #[test]
    fn test_path_separators_are_canonicalized() {
        assert_eq!(
            id_from_triple("tests\\login.spec.ts", "t", None),
            id_from_triple("./tests/login.spec.ts", "t", None),
        );
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        assert_ne!(
            id_from_triple("p", "a b", Some("c")),
            id_from_triple("p", "a", Some("b c")),
        );
    }

    #[test]
    fn test_execution_id_normalizes_title_and_suite() {
        let snake = ExecutionResult::new("valid_admin_login", ExecutionStatus::Passed)
            .with_file_path("tests/login.spec.ts")
            .with_suite("Login Functional");
        let spaced = ExecutionResult::new("Valid Admin Login", ExecutionStatus::Failed)
            .with_file_path("tests/login.spec.ts")
            .with_suite("login_functional");
        assert_eq!(id_from_execution(&snake), id_from_execution(&spaced));
    }

    #[test]
    fn test_static_id_preserves_raw_title() {
        // The static variant must NOT normalize: authors' exact titles are
        // part of the stored record's identity.
        assert_ne!(
            id_from_triple("p", "Valid Admin Login", None),
            id_from_triple("p", "valid_admin_login", None),
        );
    }

    #[test]
    fn test_identity_from_declaration_carries_group_and_modifiers() {
        let declaration = SourceDeclaration::new(
            AuthoringFamily::Playwright,
            "valid admin login",
            "e2e/login.spec.ts",
            4,
        )
        .with_group("Login")
        .with_modifier(Modifier::Only);

        let identity = identity_from_declaration(&declaration, Some("web-app"));
        assert_eq!(identity.description, "Login");
        assert_eq!(identity.kind, TestKind::EndToEnd);
        assert_eq!(identity.repository.as_deref(), Some("web-app"));
        assert!(identity.tags.contains(&"only".to_string()));
        assert!(!identity.auto_created);
        assert!(identity.validate().is_ok());
    }

    #[test]
    fn test_identity_from_execution_sets_auto_created() {
        let result = ExecutionResult::new("new test nobody declared", ExecutionStatus::Failed)
            .with_suite("Orphans");
        let identity = identity_from_execution(&result, &BuildContext::for_repository("web-app"));

        assert!(identity.auto_created);
        assert_eq!(identity.file_path, "unknown");
        assert_eq!(identity.description, "Orphans");
        assert_eq!(identity.repository.as_deref(), Some("web-app"));
        assert!(identity.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_id_from_triple_is_deterministic(
            path in "[a-zA-Z0-9_/.-]{1,40}",
            title in "\\PC{1,40}",
            group in proptest::option::of("\\PC{0,20}"),
        ) {
            let a = id_from_triple(&path, &title, group.as_deref());
            let b = id_from_triple(&path, &title, group.as_deref());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_distinct_titles_distinct_ids(
            title_a in "[a-z]{1,20}",
            title_b in "[a-z]{1,20}",
        ) {
            prop_assume!(title_a != title_b);
            prop_assert_ne!(
                id_from_triple("p", &title_a, None),
                id_from_triple("p", &title_b, None),
            );
        }
    }
}
