// crates/bitpool-cli/src/commands/mod.rs
//
// Command module declarations for the BitPool CLI.

pub mod evaluate;
pub mod request;
pub mod rules;
pub mod split;

use bitpool_core::{MemberRoster, Sats};
use bitpool_policy::PolicyEngine;

use crate::output::OutputFormat;

/// Shared state handed to every command.
pub struct Context {
    pub engine: PolicyEngine,
    pub format: OutputFormat,
    /// BTC price in US cents from the policy file.
    pub usd_price_cents: Option<u64>,
}

impl Context {
    /// `--usd-price` on the command wins over the policy file.
    pub fn price(&self, flag: Option<u64>) -> Option<u64> {
        flag.or(self.usd_price_cents)
    }
}

/// Parse a BTC amount argument such as `0.25`.
pub fn parse_amount(input: &str) -> Result<Sats, Box<dyn std::error::Error>> {
    Ok(Sats::parse_btc(input)?)
}

/// Parse a comma-separated member list, ignoring blanks.
pub fn parse_roster(input: &str) -> MemberRoster {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}
