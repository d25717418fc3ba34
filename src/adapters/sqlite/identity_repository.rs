//! SQLite implementation of the `IdentityRepository` port.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AuthoringFamily, CanonicalIdentity, TestKind, TestPriority,
};
use crate::domain::ports::IdentityRepository;
use crate::services::normalizer::normalize;

#[derive(Clone)]
pub struct SqliteIdentityRepository {
    pool: SqlitePool,
}

impl SqliteIdentityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        condition: &str,
        bind: &str,
    ) -> DomainResult<Vec<CanonicalIdentity>> {
        let rows: Vec<IdentityRow> = sqlx::query_as(&format!(
            "SELECT * FROM test_identities WHERE {condition} ORDER BY updated_at DESC"
        ))
        .bind(bind)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl IdentityRepository for SqliteIdentityRepository {
    async fn find_by_title(&self, title: &str) -> DomainResult<Vec<CanonicalIdentity>> {
        self.fetch_where("title = ?", title).await
    }

    async fn find_by_normalized_title(
        &self,
        normalized: &str,
    ) -> DomainResult<Vec<CanonicalIdentity>> {
        self.fetch_where("normalized_title = ?", normalized).await
    }

    async fn find_by_file_path_like(
        &self,
        fragment: &str,
    ) -> DomainResult<Vec<CanonicalIdentity>> {
        let escaped = fragment.replace('%', "\\%").replace('_', "\\_");
        let rows: Vec<IdentityRow> = sqlx::query_as(
            "SELECT * FROM test_identities WHERE file_path LIKE ? ESCAPE '\\' ORDER BY updated_at DESC",
        )
        .bind(format!("%{escaped}%"))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_repository_and_family(
        &self,
        repository: &str,
        family: AuthoringFamily,
    ) -> DomainResult<Vec<CanonicalIdentity>> {
        let rows: Vec<IdentityRow> = sqlx::query_as(
            "SELECT * FROM test_identities WHERE repository = ? AND family = ? ORDER BY updated_at DESC",
        )
        .bind(repository)
        .bind(family.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert_by_identifier(
        &self,
        identity: &CanonicalIdentity,
    ) -> DomainResult<CanonicalIdentity> {
        identity
            .validate()
            .map_err(DomainError::ValidationFailed)?;
        let tags_json = serde_json::to_string(&identity.tags)?;

        // Single-statement insert-or-update keyed on the identifier: two
        // concurrent reports of the same never-before-seen test cannot race
        // a separate existence check into duplicate records. The identifier
        // itself is never rewritten.
        sqlx::query(
            r"INSERT INTO test_identities
               (id, file_path, title, normalized_title, description, tags, priority,
                owner, repository, last_branch, kind, family, auto_created, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   description = excluded.description,
                   tags = excluded.tags,
                   priority = excluded.priority,
                   owner = COALESCE(excluded.owner, test_identities.owner),
                   repository = COALESCE(excluded.repository, test_identities.repository),
                   last_branch = COALESCE(excluded.last_branch, test_identities.last_branch),
                   kind = excluded.kind,
                   family = excluded.family,
                   updated_at = excluded.updated_at",
        )
        .bind(&identity.id)
        .bind(&identity.file_path)
        .bind(&identity.title)
        .bind(normalize(&identity.title))
        .bind(&identity.description)
        .bind(&tags_json)
        .bind(identity.priority.as_str())
        .bind(&identity.owner)
        .bind(&identity.repository)
        .bind(&identity.last_branch)
        .bind(identity.kind.as_str())
        .bind(identity.family.as_str())
        .bind(identity.auto_created)
        .bind(identity.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row: IdentityRow = sqlx::query_as("SELECT * FROM test_identities WHERE id = ?")
            .bind(&identity.id)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: String,
    file_path: String,
    title: String,
    #[allow(dead_code)]
    normalized_title: String,
    description: String,
    tags: String,
    priority: String,
    owner: Option<String>,
    repository: Option<String>,
    last_branch: Option<String>,
    kind: String,
    family: String,
    auto_created: bool,
    updated_at: String,
}

impl TryFrom<IdentityRow> for CanonicalIdentity {
    type Error = DomainError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)?;
        let updated_at = super::parse_datetime(&row.updated_at)?;

        Ok(CanonicalIdentity {
            id: row.id,
            file_path: row.file_path,
            title: row.title,
            description: row.description,
            tags,
            priority: TestPriority::from_str(&row.priority).unwrap_or_default(),
            owner: row.owner,
            repository: row.repository,
            last_branch: row.last_branch,
            kind: TestKind::from_str(&row.kind).unwrap_or_default(),
            family: AuthoringFamily::from_str(&row.family).unwrap_or_default(),
            auto_created: row.auto_created,
            updated_at,
        })
    }
}
