//! `testloom correlate`: match execution results against stored identities.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{SqliteCorrelationRepository, SqliteIdentityRepository};
use crate::cli::output::format_correlations_table;
use crate::domain::models::{BuildContext, ExecutionResult};
use crate::domain::ports::CorrelationRepository;
use crate::infrastructure::config::ConfigLoader;
use crate::services::CorrelationEngine;

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    /// JSON file holding an array of execution results.
    pub results: PathBuf,

    /// Repository the run executed against.
    #[arg(long)]
    pub repository: Option<String>,

    /// Branch the run executed against.
    #[arg(long)]
    pub branch: Option<String>,

    /// CI platform label (used for cache scoping when results carry no
    /// authoring family).
    #[arg(long)]
    pub platform: Option<String>,

    /// Do not persist correlation outcomes to history.
    #[arg(long)]
    pub no_record: bool,
}

pub async fn execute(args: CorrelateArgs, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(&args.results)
        .with_context(|| format!("Failed to read {}", args.results.display()))?;
    let results: Vec<ExecutionResult> =
        serde_json::from_str(&text).context("Failed to parse execution results")?;

    let config = ConfigLoader::load()?;
    let pool = super::open_database(&config).await?;
    let identities = Arc::new(SqliteIdentityRepository::new(pool.clone()));
    let history = SqliteCorrelationRepository::new(pool);
    let engine = CorrelationEngine::new(identities, config.engine.clone());

    let context = BuildContext {
        repository: args.repository,
        branch: args.branch,
        platform: args.platform,
    };

    let mut correlations = Vec::with_capacity(results.len());
    for result in results {
        let correlation = engine
            .correlate(result, &context)
            .await
            .context("Correlation failed")?;
        if !args.no_record {
            history
                .record(&correlation)
                .await
                .context("Failed to record correlation")?;
        }
        correlations.push(correlation);
    }

    let stats = engine.stats();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "correlations": correlations,
                "stats": stats,
            })
        );
    } else {
        if correlations.is_empty() {
            println!("No execution results in {}", args.results.display());
            return Ok(());
        }
        println!("{}", format_correlations_table(&correlations));
        println!(
            "\n{} correlated: {} direct, {} fuzzy, {} created, {} unmatched",
            stats.total, stats.direct, stats.fuzzy, stats.created, stats.failed
        );
    }
    Ok(())
}
