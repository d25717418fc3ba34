//! Integration tests for the SQLite identity repository.

mod helpers;

use chrono::Utc;

use testloom::adapters::sqlite::SqliteIdentityRepository;
use testloom::domain::models::{AuthoringFamily, CanonicalIdentity};
use testloom::domain::ports::IdentityRepository;

use helpers::database::setup_test_db;

fn identity(id: &str, path: &str, title: &str) -> CanonicalIdentity {
    let mut identity = CanonicalIdentity::new(id, path, title);
    identity.updated_at = Utc::now();
    identity
}

#[tokio::test]
async fn upsert_then_find_by_title() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    let stored = identity("id-1", "tests/login.spec.ts", "Valid admin login");
    repository.upsert_by_identifier(&stored).await.unwrap();

    let found = repository.find_by_title("Valid admin login").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "id-1");

    let missing = repository.find_by_title("No such test").await.unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn find_by_normalized_title_bridges_naming_conventions() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    repository
        .upsert_by_identifier(&identity("id-1", "tests/login.spec.ts", "Valid Admin Login"))
        .await
        .unwrap();

    // The stored normalized column is derived from the raw title, so a
    // snake_case report resolves to the same row.
    let found = repository
        .find_by_normalized_title("valid admin login")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Valid Admin Login");
}

#[tokio::test]
async fn find_by_file_path_like_matches_fragments() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    repository
        .upsert_by_identifier(&identity("id-1", "e2e/auth/login.spec.ts", "a"))
        .await
        .unwrap();
    repository
        .upsert_by_identifier(&identity("id-2", "src/util.test.ts", "b"))
        .await
        .unwrap();

    let found = repository.find_by_file_path_like("login.spec.ts").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "id-1");

    // LIKE wildcards in the fragment are treated literally.
    let none = repository.find_by_file_path_like("%").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn find_by_repository_and_family_scopes_the_pool() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    let mut in_scope = identity("id-1", "a.spec.ts", "a");
    in_scope.repository = Some("web-app".to_string());
    in_scope.family = AuthoringFamily::Playwright;
    repository.upsert_by_identifier(&in_scope).await.unwrap();

    let mut wrong_family = identity("id-2", "b.test.ts", "b");
    wrong_family.repository = Some("web-app".to_string());
    wrong_family.family = AuthoringFamily::Jest;
    repository.upsert_by_identifier(&wrong_family).await.unwrap();

    let mut wrong_repo = identity("id-3", "c.spec.ts", "c");
    wrong_repo.repository = Some("other".to_string());
    wrong_repo.family = AuthoringFamily::Playwright;
    repository.upsert_by_identifier(&wrong_repo).await.unwrap();

    let found = repository
        .find_by_repository_and_family("web-app", AuthoringFamily::Playwright)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "id-1");
}

#[tokio::test]
async fn upsert_refreshes_metadata_without_changing_identifier() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    let mut original = identity("stable-id", "tests/a.spec.ts", "a");
    original.auto_created = true;
    repository.upsert_by_identifier(&original).await.unwrap();

    let mut refresh = identity("stable-id", "tests/a.spec.ts", "a");
    refresh.description = "Login".to_string();
    refresh.last_branch = Some("main".to_string());
    let updated = repository.upsert_by_identifier(&refresh).await.unwrap();

    assert_eq!(updated.id, "stable-id");
    assert_eq!(updated.description, "Login");
    assert_eq!(updated.last_branch.as_deref(), Some("main"));
    // The auto-created flag records first observation and survives refreshes.
    assert!(updated.auto_created);

    let all = repository.find_by_title("a").await.unwrap();
    assert_eq!(all.len(), 1, "upsert must not duplicate rows");
}

#[tokio::test]
async fn upsert_rejects_invalid_identities() {
    let pool = setup_test_db().await;
    let repository = SqliteIdentityRepository::new(pool);

    let invalid = CanonicalIdentity::new("", "p", "t");
    assert!(repository.upsert_by_identifier(&invalid).await.is_err());
}
