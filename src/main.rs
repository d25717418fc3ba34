//! Testloom CLI entry point.

use clap::Parser;

use testloom::cli::{Cli, Commands};
use testloom::infrastructure::config::ConfigLoader;
use testloom::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging_config = ConfigLoader::load()
        .map(|config| config.logging)
        .unwrap_or_default();
    if let Err(err) = init_logging(&logging_config) {
        eprintln!("Warning: {err:#}");
    }

    let result = match cli.command {
        Commands::Init(args) => testloom::cli::commands::init::execute(args, cli.json).await,
        Commands::Scan(args) => testloom::cli::commands::scan::execute(args, cli.json).await,
        Commands::Correlate(args) => {
            testloom::cli::commands::correlate::execute(args, cli.json).await
        }
        Commands::Patterns(args) => {
            testloom::cli::commands::patterns::execute(args, cli.json).await
        }
        Commands::Stats(args) => testloom::cli::commands::stats::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        testloom::cli::handle_error(err, cli.json);
    }
}
