//! `testloom init`: create project config and database.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use tracing::info;

use crate::domain::models::Config;

/// Default project configuration written by `init`.
const CONFIG_TEMPLATE: &str = r"# Testloom project configuration.
# Overrides: .testloom/local.yaml, then TESTLOOM_* environment variables.

database:
  path: .testloom/testloom.db
  max_connections: 10

logging:
  level: info
  format: pretty

engine:
  similarity_threshold: 0.6
  cache_confidence_floor: 0.7
  cache_capacity: 4096
  max_scored_candidates: 64
  pattern_lookback: 10
";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: InitArgs, json: bool) -> Result<()> {
    let config_path = Path::new(".testloom/config.yaml");
    let config_created = if config_path.exists() && !args.force {
        false
    } else {
        std::fs::create_dir_all(".testloom").context("Failed to create .testloom directory")?;
        std::fs::write(config_path, CONFIG_TEMPLATE).context("Failed to write config file")?;
        true
    };

    let config = Config::default();
    let pool = super::open_database(&config).await?;
    pool.close().await;
    info!(path = config.database.path.as_str(), "database initialized");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "config_created": config_created,
                "database": config.database.path,
            })
        );
    } else {
        if config_created {
            println!("Wrote {}", config_path.display());
        } else {
            println!("{} already exists (use --force to overwrite)", config_path.display());
        }
        println!("Database ready at {}", config.database.path);
    }
    Ok(())
}
