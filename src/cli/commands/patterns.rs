//! `testloom patterns`: classify failure recurrence for one identity.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::SqliteCorrelationRepository;
use crate::cli::output::format_pattern_table;
use crate::infrastructure::config::ConfigLoader;
use crate::services::FailurePatternDetector;

#[derive(Debug, Args)]
pub struct PatternsArgs {
    /// Canonical identity identifier (full hash).
    pub identity_id: String,

    /// How many recent failures to consult.
    #[arg(long)]
    pub lookback: Option<usize>,
}

pub async fn execute(args: PatternsArgs, json: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = super::open_database(&config).await?;
    let history = SqliteCorrelationRepository::new(pool);

    let lookback = args.lookback.unwrap_or(config.engine.pattern_lookback);
    let detector = FailurePatternDetector::new(lookback);
    let pattern = detector
        .detect_for_identity(&history, &args.identity_id)
        .await
        .context("Failed to load failure history")?;

    if json {
        println!("{}", serde_json::json!({ "pattern": pattern }));
    } else {
        match pattern {
            Some(pattern) => println!("{}", format_pattern_table(&pattern)),
            None => println!("Not enough failure history (need at least 3 failures)."),
        }
    }
    Ok(())
}
