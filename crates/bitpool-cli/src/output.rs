// crates/bitpool-cli/src/output.rs
//
// Output formatting utilities for the BitPool CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use bitpool_core::{format_usd_cents, Sats};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// BTC with six decimals, the way balances are shown to members.
pub fn btc_cell(amount: Sats) -> String {
    format!("\u{20bf}{}", amount.to_btc_fixed(6))
}

/// Fiat column value, or `--` when no price is known.
pub fn usd_cell(amount: Sats, price_cents: Option<u64>) -> String {
    match price_cents {
        Some(price) => format_usd_cents(amount.fiat_cents(price)),
        None => "--".to_string(),
    }
}

/// Text progress bar for a fraction in [0, 1].
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
