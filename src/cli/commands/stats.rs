//! `testloom stats`: corpus statistics.

use anyhow::{Context, Result};
use clap::Args;

use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct StatsArgs {}

pub async fn execute(_args: StatsArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = super::open_database(&config).await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM test_identities")
        .fetch_one(&pool)
        .await
        .context("Failed to count identities")?;
    let (auto_created,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM test_identities WHERE auto_created = 1")
            .fetch_one(&pool)
            .await
            .context("Failed to count auto-created identities")?;
    let by_family: Vec<(String, i64)> = sqlx::query_as(
        "SELECT family, COUNT(*) FROM test_identities GROUP BY family ORDER BY COUNT(*) DESC",
    )
    .fetch_all(&pool)
    .await
    .context("Failed to count identities by family")?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "total": total,
                "auto_created": auto_created,
                "by_family": by_family.iter().map(|(f, c)| (f.clone(), *c)).collect::<Vec<_>>(),
            })
        );
    } else {
        println!("Identities: {total} ({auto_created} auto-created)");
        for (family, count) in by_family {
            println!("  {family:<12} {count}");
        }
    }
    Ok(())
}
