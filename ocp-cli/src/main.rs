//! ocp - command-line interface for reconciling OCP clusters and node pools.

mod commands;
mod manifest;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ocp_reconciler::observability::{LogFormat, TracingConfig, init_tracing};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Default location of the state file.
const DEFAULT_STATE: &str = "ocp-state.json";

/// ocp - Declarative management of OCP Kubernetes clusters.
#[derive(Parser)]
#[command(name = "ocp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, update or delete resources to match a manifest
    Apply {
        /// Path to the manifest YAML file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the state file
        #[arg(short, long, default_value = DEFAULT_STATE)]
        state: PathBuf,
    },

    /// Show what apply would change, without calling the backend
    Plan {
        /// Path to the manifest YAML file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the state file
        #[arg(short, long, default_value = DEFAULT_STATE)]
        state: PathBuf,
    },

    /// Re-read tracked resources and update the state file
    Refresh {
        /// Path to the state file
        #[arg(short, long, default_value = DEFAULT_STATE)]
        state: PathBuf,
    },

    /// Delete every tracked resource
    Destroy {
        /// Path to the state file
        #[arg(short, long, default_value = DEFAULT_STATE)]
        state: PathBuf,

        /// Skip the confirmation and delete
        #[arg(long)]
        yes: bool,
    },

    /// Backend operation commands
    Operation {
        #[command(subcommand)]
        action: OperationAction,
    },

    /// List what the backend offers
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum OperationAction {
    /// Wait for an operation to finish
    Wait {
        /// Operation ID
        id: String,

        /// Give up after this many seconds
        #[arg(short, long, default_value = "3600")]
        timeout: u64,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List instance flavors
    Flavors {
        /// Only flavors whose name contains this text
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List supported Kubernetes versions
    Versions,

    /// List networking options
    Networking,

    /// List installable addons
    Addons {
        /// Only addons whose name contains this text
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Check for explicit log format override, otherwise auto-detect
    let log_format = std::env::var("OCP_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse::<LogFormat>().ok())
        .unwrap_or_else(|| {
            if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                LogFormat::Pretty
            } else {
                LogFormat::Compact
            }
        });

    // Build config, respecting OCP_LOG_LEVEL / RUST_LOG if set
    let log_filter = std::env::var("OCP_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| filter.to_string());

    let config = TracingConfig::builder()
        .log_format(log_format)
        .log_filter(log_filter)
        .build();

    init_tracing(&config)
}

/// Token cancelled on Ctrl-C, so operation waits stop cleanly.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, no longer waiting for backend operations");
            trigger.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let cancel = interrupt_token();

    match cli.command {
        Commands::Apply { file, state } => commands::apply::run(&file, &state, cancel).await,
        Commands::Plan { file, state } => commands::plan::run(&file, &state),
        Commands::Refresh { state } => commands::refresh::run(&state, cancel).await,
        Commands::Destroy { state, yes } => commands::destroy::run(&state, yes, cancel).await,
        Commands::Operation { action } => match action {
            OperationAction::Wait { id, timeout } => {
                commands::operation::wait(&id, timeout, cancel).await
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Flavors { name } => commands::catalog::flavors(name.as_deref()).await,
            CatalogAction::Versions => commands::catalog::versions().await,
            CatalogAction::Networking => commands::catalog::networking().await,
            CatalogAction::Addons { name } => commands::catalog::addons(name.as_deref()).await,
        },
        Commands::Version => commands::version::run(),
    }
}
