//! bnc-ingest - BNC spoken-corpus metadata normalizer
//!
//! Reads BNC XML documents, resolves settings and speakers against each
//! document's header and writes five relational tables to SQLite in a
//! single transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bnc_common::config::{resolve_database_path, TomlConfig};
use bnc_common::db::init_database;
use bnc_ingest::corpus::NormalizeOptions;
use bnc_ingest::services::{BatchImporter, FileScanner};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for bnc-ingest
#[derive(Parser, Debug)]
#[command(name = "bnc-ingest")]
#[command(about = "Normalize BNC spoken-corpus metadata into SQLite")]
#[command(version)]
struct Args {
    /// Corpus files or directories, processed in the order given
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// SQLite database file (overrides BNC_INGEST_DATABASE and the config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Config file (default: <config dir>/bnc-ingest/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Placeholder speaker code exempt from unknown-person diagnostics; repeatable
    #[arg(long = "placeholder", value_name = "CODE")]
    placeholders: Vec<String>,

    /// Process everything, then roll the transaction back
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Needed before tracing init: the file may set the default log level
    let toml_config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting bnc-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = resolve_database_path(args.database.as_deref(), &toml_config);
    info!("Database: {}", db_path.display());

    let placeholders = if args.placeholders.is_empty() {
        toml_config.placeholder_speakers()
    } else {
        args.placeholders.clone()
    };
    let options = NormalizeOptions::with_placeholders(placeholders);

    let files = FileScanner::new()
        .scan_all(&args.roots)
        .context("Failed to discover corpus files")?;
    if files.is_empty() {
        warn!("No corpus documents found");
    }
    info!("{} document(s) to process", files.len());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let summary = BatchImporter::new(pool.clone(), options)
        .dry_run(args.dry_run)
        .import(&files)
        .await
        .context("Batch aborted; no rows were written")?;

    info!("{}", summary.display_string());
    pool.close().await;

    Ok(())
}
