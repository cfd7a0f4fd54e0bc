//! DocVault — document version ledger, access policies, and download tokens.
//!
//! Main entry point that wires all crates together and runs maintenance.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use docvault_core::config::{AppConfig, LoggingConfig};
use docvault_database::DatabasePool;
use docvault_service::{Services, StoreSet};
use docvault_worker::{MaintenanceScheduler, TokenCleanupJob};

/// DocVault maintenance and operations
#[derive(Debug, Parser)]
#[command(name = "docvault", version, about, long_about = None)]
struct Cli {
    /// Configuration environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply migrations and run the maintenance scheduler until shutdown
    Run,
    /// Apply pending database migrations
    Migrate,
    /// Delete expired download tokens once
    CleanupTokens,
    /// Print ledger statistics as JSON
    Stats,
    /// Print recent audit entries for a document as JSON
    Audit {
        /// Document ID
        #[arg(long)]
        document: Uuid,
        /// Maximum number of entries
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = execute(cli.command, config).await {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn execute(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;

    let result = match command {
        Commands::Run => run(&config, &db).await,
        Commands::Migrate => {
            let report = db.prepare().await.context("Migration failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::CleanupTokens => {
            let services = build_services(&config, &db)?;
            let removed = TokenCleanupJob::new(Arc::clone(&services.tokens))
                .run()
                .await
                .context("Token cleanup failed")?;
            println!("{removed}");
            Ok(())
        }
        Commands::Stats => {
            let services = build_services(&config, &db)?;
            let stats = services.ledger.stats().await.context("Stats query failed")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::Audit { document, limit } => {
            let entries = db
                .repositories()
                .audit
                .find_by_resource(document, limit)
                .await
                .context("Audit query failed")?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
    };

    db.close().await;
    result
}

fn build_services(config: &AppConfig, db: &DatabasePool) -> anyhow::Result<Services> {
    Services::build(StoreSet::postgres(db), &config.ledger, &config.tokens)
        .context("Service initialization failed")
}

/// Migrate, start the scheduler, and wait for a shutdown signal.
async fn run(config: &AppConfig, db: &DatabasePool) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting DocVault");

    let schema = db.prepare().await.context("Database preparation failed")?;
    if !schema.is_current() {
        anyhow::bail!(
            "Schema has {} of {} migrations applied",
            schema.applied,
            schema.known
        );
    }

    let services = build_services(config, db)?;

    let scheduler = if config.worker.enabled {
        let scheduler =
            MaintenanceScheduler::new(TokenCleanupJob::new(Arc::clone(&services.tokens))).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await?;
    }

    tracing::info!("DocVault shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
