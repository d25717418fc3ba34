//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Test identity and correlation engine.
#[derive(Debug, Parser)]
#[command(name = "testloom", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize project configuration and database.
    Init(commands::init::InitArgs),
    /// Scan test source files and register canonical identities.
    Scan(commands::scan::ScanArgs),
    /// Correlate a batch of execution results against stored identities.
    Correlate(commands::correlate::CorrelateArgs),
    /// Classify the failure pattern of one canonical identity.
    Patterns(commands::patterns::PatternsArgs),
    /// Show corpus statistics.
    Stats(commands::stats::StatsArgs),
}

/// Print an error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        eprintln!(
            "{}",
            serde_json::json!({ "error": format!("{err:#}") })
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
