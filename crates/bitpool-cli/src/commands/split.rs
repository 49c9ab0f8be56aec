// crates/bitpool-cli/src/commands/split.rs
//
// `bitpool split --amount <btc>`: show how a deposit lands in the pool.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use bitpool_core::{DepositSplit, Sats};

use super::{parse_amount, Context};
use crate::output::{btc_cell, format_json, format_table, usd_cell, OutputFormat};

/// Deposit split command.
#[derive(Debug, Args)]
pub struct SplitCmd {
    /// Deposit amount in BTC, e.g. `0.05`.
    #[arg(long)]
    pub amount: String,

    /// BTC price in US cents for the fiat column.
    #[arg(long)]
    pub usd_price: Option<u64>,
}

#[derive(Tabled)]
struct SplitRow {
    #[tabled(rename = "Destination")]
    destination: &'static str,
    #[tabled(rename = "BTC")]
    btc: String,
    #[tabled(rename = "USD")]
    usd: String,
}

#[derive(Serialize)]
struct SplitOutput {
    amount: Sats,
    #[serde(flatten)]
    split: DepositSplit,
}

/// Run the split command.
pub async fn run(ctx: &Context, cmd: &SplitCmd) -> Result<(), Box<dyn std::error::Error>> {
    let amount = parse_amount(&cmd.amount)?;
    let split = ctx.engine.split(amount)?;
    let price = ctx.price(cmd.usd_price);

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&SplitOutput { amount, split })),
        OutputFormat::Table => {
            let rows = vec![
                SplitRow {
                    destination: "Available",
                    btc: btc_cell(split.available),
                    usd: usd_cell(split.available, price),
                },
                SplitRow {
                    destination: "Vault",
                    btc: btc_cell(split.vault),
                    usd: usd_cell(split.vault, price),
                },
                SplitRow {
                    destination: "Total",
                    btc: btc_cell(amount),
                    usd: usd_cell(amount, price),
                },
            ];
            println!("{}", format_table(&rows));
        }
    }

    Ok(())
}
