// crates/bitpool-cli/src/commands/evaluate.rs
//
// `bitpool evaluate`: run the withdrawal gate against a balance.

use clap::Args;
use serde::Serialize;

use bitpool_core::{Balance, Sats};
use bitpool_policy::GateDecision;

use super::{parse_amount, Context};
use crate::output::{btc_cell, format_json, usd_cell, OutputFormat};

/// Withdrawal evaluation command.
#[derive(Debug, Args)]
pub struct EvaluateCmd {
    /// Requested amount in BTC.
    #[arg(long)]
    pub amount: String,

    /// Available (withdrawable) balance in BTC.
    #[arg(long)]
    pub available: String,

    /// Vault balance in BTC. Never withdrawable; shown for context.
    #[arg(long, default_value = "0")]
    pub vault: String,

    /// BTC price in US cents for the fiat column.
    #[arg(long)]
    pub usd_price: Option<u64>,
}

#[derive(Serialize)]
struct EvaluateOutput {
    requested: Sats,
    balance: Balance,
    instant_threshold: Sats,
    decision: GateDecision,
}

/// Run the evaluate command.
pub async fn run(ctx: &Context, cmd: &EvaluateCmd) -> Result<(), Box<dyn std::error::Error>> {
    let requested = parse_amount(&cmd.amount)?;
    let balance = Balance::with_amounts(parse_amount(&cmd.available)?, parse_amount(&cmd.vault)?);
    let decision = ctx.engine.evaluate(requested, &balance)?;
    let threshold = ctx.engine.instant_threshold(&balance);
    let price = ctx.price(cmd.usd_price);

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&EvaluateOutput {
                requested,
                balance,
                instant_threshold: threshold,
                decision,
            })
        ),
        OutputFormat::Table => {
            println!("Requested:         {} ({})", btc_cell(requested), usd_cell(requested, price));
            println!("Available:         {}", btc_cell(balance.available));
            println!("Vault:             {}", btc_cell(balance.vault));
            println!("Instant threshold: {}", btc_cell(threshold));
            println!("Decision:          {}", decision);
            if decision == GateDecision::RequiresVote {
                println!();
                println!(
                    "Open a request with: bitpool request open --amount {} ...",
                    cmd.amount
                );
            }
        }
    }

    Ok(())
}
