//! projsync — keep a remote project catalog in step with local manifests.
//!
//! # Usage
//!
//! ```text
//! projsync sync [ROOTS...] [--dry-run] [--delete-missing] [--allow-private]
//!               [--allow-different-owner] [--json]
//! projsync plan [ROOTS...] [--allow-private] [--allow-different-owner] [--json]
//! projsync manifests [ROOTS...] [--json]
//! ```

mod catalog;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{manifests::ManifestsArgs, plan::PlanArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "projsync",
    version,
    about = "Reconcile project manifests with a remote project catalog",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push declared projects to the catalog and optionally delete dangling ones.
    Sync(SyncArgs),

    /// Show what a sync would push, reject and leave dangling.
    Plan(PlanArgs),

    /// List discovered manifests and their entries without contacting the catalog.
    Manifests(ManifestsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Manifests(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
