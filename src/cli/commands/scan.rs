//! `testloom scan`: extract declarations and register canonical identities.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use crate::adapters::sqlite::SqliteIdentityRepository;
use crate::cli::output::format_declarations_table;
use crate::domain::models::AuthoringFamily;
use crate::domain::ports::IdentityRepository;
use crate::infrastructure::config::ConfigLoader;
use crate::services::identity::identity_from_declaration;
use crate::services::DeclarationExtractor;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Test source files to scan.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Repository the scanned files belong to.
    #[arg(long)]
    pub repository: Option<String>,

    /// Skip authoring-family detection and use this family for every file.
    #[arg(long)]
    pub family: Option<String>,
}

pub async fn execute(args: ScanArgs, json: bool) -> Result<()> {
    let hint = match args.family.as_deref() {
        Some(name) => Some(
            AuthoringFamily::from_str(name)
                .with_context(|| format!("Unknown authoring family: {name}"))?,
        ),
        None => None,
    };

    let config = ConfigLoader::load()?;
    let pool = super::open_database(&config).await?;
    let repository = Arc::new(SqliteIdentityRepository::new(pool));
    let extractor = DeclarationExtractor::new();

    let mut all_declarations = Vec::new();
    let mut duplicate_ids: Vec<String> = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for path in &args.paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let extraction = extractor.extract(&text, &path.to_string_lossy(), hint);

        for declaration in &extraction.declarations {
            let identity = identity_from_declaration(declaration, args.repository.as_deref());
            // Duplicate identifiers (same title inside one group) are a
            // data-quality warning, not a failure; last writer wins.
            if let Some(previous) = seen.insert(identity.id.clone(), declaration.title.clone()) {
                warn!(
                    id = identity.id.as_str(),
                    title = previous.as_str(),
                    "duplicate declaration hashes to an existing identifier"
                );
                duplicate_ids.push(identity.id.clone());
            }
            repository
                .upsert_by_identifier(&identity)
                .await
                .with_context(|| format!("Failed to store identity for '{}'", declaration.title))?;
        }
        all_declarations.extend(extraction.declarations);
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "declarations": all_declarations,
                "duplicates": duplicate_ids,
            })
        );
    } else {
        if all_declarations.is_empty() {
            println!("No test declarations found.");
            return Ok(());
        }
        println!("{}", format_declarations_table(&all_declarations));
        println!(
            "\nRegistered {} declaration{} from {} file{}",
            all_declarations.len(),
            if all_declarations.len() == 1 { "" } else { "s" },
            args.paths.len(),
            if args.paths.len() == 1 { "" } else { "s" },
        );
        if !duplicate_ids.is_empty() {
            println!(
                "Warning: {} duplicate declaration(s) collapsed to existing identifiers",
                duplicate_ids.len()
            );
        }
    }
    Ok(())
}
