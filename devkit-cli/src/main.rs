//! DevKit: keep a fleet of repositories in sync with a shared skeleton.
//!
//! # Usage
//!
//! ```text
//! devkit dispatch      [owner::repo ...] [--apply] [--do-not-delete-fork]
//! devkit src-migrate   [owner::repo ...] [--apply] [--do-not-delete-fork]
//! devkit pr-auto-merge [owner::repo ...] [--apply]
//! devkit pr-auto-close [owner::repo ...] [--apply]
//! devkit auto-merge    [owner::repo ...] [--apply]
//! ```
//!
//! Without `--apply` nothing is pushed, forked, merged or closed.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    close::PrAutoCloseArgs,
    dispatch::DispatchArgs,
    merge::{AutoMergeArgs, PrAutoMergeArgs},
    migrate::SrcMigrateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "devkit",
    version,
    about = "Apply the shared project skeleton across a fleet of GitHub repositories",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply the skeleton to every active repository and open pull requests.
    Dispatch(DispatchArgs),

    /// Move package sources under src/ and open pull requests.
    SrcMigrate(SrcMigrateArgs),

    /// Merge open DevKit pull requests.
    PrAutoMerge(PrAutoMergeArgs),

    /// Close open DevKit pull requests.
    PrAutoClose(PrAutoCloseArgs),

    /// Merge update-branch into master directly.
    AutoMerge(AutoMergeArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Dispatch(args) => args.run(),
        Commands::SrcMigrate(args) => args.run(),
        Commands::PrAutoMerge(args) => args.run(),
        Commands::PrAutoClose(args) => args.run(),
        Commands::AutoMerge(args) => args.run(),
    }
}

/// Log to stderr; stdout carries the run summary.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
