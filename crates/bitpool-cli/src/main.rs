// crates/bitpool-cli/src/main.rs
//
// CLI entrypoint for the BitPool treasury policy engine.
//
// Provides subcommands for showing the group rules, splitting deposits,
// evaluating withdrawals, and driving vote-gated withdrawal requests.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bitpool_policy::PolicyEngine;
use commands::evaluate::EvaluateCmd;
use commands::request::RequestCmd;
use commands::split::SplitCmd;
use commands::Context;
use config::{expand_tilde, PolicyFile};
use output::OutputFormat;

/// BitPool CLI: group protection rules for a shared bitcoin pool.
#[derive(Parser, Debug)]
#[command(
    name = "bitpool",
    version = "0.1.0",
    about = "BitPool treasury policy engine: deposit splits, withdrawal gating and group votes"
)]
struct Cli {
    /// Path to the policy file (TOML).
    #[arg(long, global = true, default_value = "~/.bitpool/policy.toml")]
    config: String,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the active group protection rules.
    Rules,

    /// Split a deposit between the available balance and the vault.
    Split(SplitCmd),

    /// Classify a withdrawal as instant, vote-gated or rejected.
    Evaluate(EvaluateCmd),

    /// Withdrawal requests: open, vote, status.
    #[command(subcommand)]
    Request(RequestCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = PathBuf::from(expand_tilde(&cli.config));
    let (file, loaded) = if config_path.exists() {
        (PolicyFile::load(&config_path)?, true)
    } else {
        (PolicyFile::default(), false)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&file.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if loaded {
        tracing::debug!("Loaded policy from {}", config_path.display());
    } else {
        tracing::warn!(
            "Policy file {} not found, using default rules",
            config_path.display()
        );
    }

    let ctx = Context {
        engine: PolicyEngine::new(file.to_policy()?),
        format: OutputFormat::from_json_flag(cli.json),
        usd_price_cents: file.btc_usd_price_cents,
    };

    match &cli.command {
        Commands::Rules => commands::rules::run(&ctx).await?,
        Commands::Split(cmd) => commands::split::run(&ctx, cmd).await?,
        Commands::Evaluate(cmd) => commands::evaluate::run(&ctx, cmd).await?,
        Commands::Request(cmd) => commands::request::run(&ctx, cmd).await?,
    }

    Ok(())
}
