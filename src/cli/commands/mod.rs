//! CLI command implementations.

pub mod correlate;
pub mod init;
pub mod patterns;
pub mod scan;
pub mod stats;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, verify_connection, Migrator};
use crate::domain::models::Config;

/// Open the configured database and bring its schema up to date.
pub(crate) async fn open_database(config: &Config) -> Result<SqlitePool> {
    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;
    verify_connection(&pool)
        .await
        .context("Database is not reachable")?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}
