//! SQLite implementation of the `CorrelationRepository` port.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CorrelatedFailure, Correlation, ExecutionStatus};
use crate::domain::ports::CorrelationRepository;

#[derive(Clone)]
pub struct SqliteCorrelationRepository {
    pool: SqlitePool,
}

impl SqliteCorrelationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CorrelationRepository for SqliteCorrelationRepository {
    async fn record(&self, correlation: &Correlation) -> DomainResult<()> {
        let occurred_at = correlation
            .result
            .completed_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339();

        sqlx::query(
            "INSERT INTO correlations
             (identity_id, title, status, confidence, strategy, error_message, occurred_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(correlation.identity.as_ref().map(|i| i.id.as_str()))
        .bind(&correlation.result.title)
        .bind(correlation.result.status.as_str())
        .bind(correlation.confidence)
        .bind(correlation.strategy.as_str())
        .bind(correlation.result.error_messages.first().map(String::as_str))
        .bind(occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_failures(
        &self,
        identity_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<CorrelatedFailure>> {
        let rows: Vec<(Option<String>, String)> = sqlx::query_as(
            "SELECT error_message, occurred_at FROM correlations
             WHERE identity_id = ? AND status = ?
             ORDER BY occurred_at DESC
             LIMIT ?",
        )
        .bind(identity_id)
        .bind(ExecutionStatus::Failed.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(message, occurred_at)| {
                Ok(CorrelatedFailure::new(
                    identity_id,
                    message.unwrap_or_default(),
                    super::parse_datetime(&occurred_at)?,
                ))
            })
            .collect()
    }
}
