//! # Parking CLI
//!
//! Runs one command against the parking database and prints the reply as
//! JSON on stdout. Logs go to stderr.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Parse arguments
//! 3. Load configuration from the environment
//! 4. Connect to the database & run migrations
//! 5. Run the command, print JSON
//!
//! Exit status: 0 on success, 1 with an `ApiError` JSON body on failure,
//! 2 on a usage error.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use parking_api::cli::Cli;
use parking_api::{AppConfig, ParkingService};
use parking_db::{Database, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    // Usage errors and --help exit here (status 2 / 0)
    let command = Cli::parse().command;
    debug!(?command, "Parsed command");

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(db_path = %config.db_path, "Configuration loaded");

    let db = Database::new(config.db_config())
        .await
        .context("failed to open database")?;

    let service = ParkingService::new(SqliteStore::new(db.clone()));
    let outcome = command.run(&service).await;
    db.close().await;

    match outcome {
        Ok(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=parking_db=trace` - Trace the store only
/// - Default: `info,parking=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,parking=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
