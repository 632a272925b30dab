//! Sentinel: keeps GitOps applications healthy and in sync.
//!
//! # Usage
//!
//! ```text
//! sentinel run [--config FILE] [--once] [--log-format text|json] [--max-cycles N]
//!              [--argocd-api URL] [--rollback-mode workflow-dispatch|git-revert|disabled] ...
//! ```
//!
//! Every setting can also come from its environment variable
//! (`ARGOCD_TOKEN`, `SLACK_WEBHOOK_URL`, ...) or from the YAML file.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::run::RunArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sentinel",
    version,
    about = "Reconcile Argo CD applications: sync drift, pause on repeated failure, roll back bad rollouts",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the controller and reconcile every application.
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
    }
}
