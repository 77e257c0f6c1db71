//! Command-line interface for nebula-load
//!
//! # Usage
//!
//! ```bash
//! # Import with the default config file
//! nebula-load
//!
//! # Explicit config, smaller batches, no post-load validation
//! nebula-load --config ./nebula_config.yaml --batch-size 100 --no-validate
//!
//! # Render statements and count rows without writing anything
//! nebula-load --dry-run
//! ```
//!
//! Exit code is 0 on success and 1 on any fatal error (missing config,
//! failed connect, unreadable input table, failed tag creation) or when
//! the run is interrupted with Ctrl+C. Failed insert batches are not
//! fatal; they show up in the run summary instead.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nebula_load::config::LoggingConfig;
use nebula_load::{AppConfig, Loader};

#[derive(Parser)]
#[command(name = "nebula-load")]
#[command(about = "Bulk-load GraphRAG entities and relationships into NebulaGraph")]
#[command(long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        long,
        default_value = "nebula_config.yaml",
        env = "NEBULA_LOAD_CONFIG"
    )]
    config: PathBuf,

    /// Override the configured batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Dry run mode - don't actually write data
    #[arg(long)]
    dry_run: bool,

    /// Skip post-load count validation
    #[arg(long)]
    no_validate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    if let Some(batch_size) = cli.batch_size {
        anyhow::ensure!(batch_size > 0, "--batch-size must be at least 1");
        config.import.batch_size = batch_size;
    }
    if cli.no_validate {
        config.import.validate_data = false;
    }

    let loader = Loader::connect(config)
        .await
        .context("Failed to connect to the graph store")?
        .with_dry_run(cli.dry_run);

    match race_interrupt(loader.run(), shutdown_signal()).await {
        Some(result) => {
            result.context("Import failed")?;
        }
        None => {
            tracing::warn!("Received interrupt signal (Ctrl+C), aborting import");
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Resolves when the user interrupts the process. If the signal handler
/// cannot be installed the future never resolves and the run proceeds
/// unguarded.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Race the import against an interrupt future. `None` means the
/// interrupt won.
async fn race_interrupt<T>(
    run: impl std::future::Future<Output = T>,
    interrupt: impl std::future::Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        result = run => Some(result),
        _ = interrupt => None,
    }
}


/// Initialize tracing from the config's logging section. `RUST_LOG` wins
/// over the configured level; an optional file sink is layered on top of
/// stderr output.
fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .context("invalid logging level")?;

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(stderr_layer);

    match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Arc::new(file));
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
    Ok(())
}
