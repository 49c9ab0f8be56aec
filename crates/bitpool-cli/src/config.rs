// crates/bitpool-cli/src/config.rs
//
// Policy configuration for the BitPool CLI.
// Loaded from a TOML file or populated with the group protection defaults.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use bitpool_core::PolicyConfig;

/// On-disk policy file.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    /// Fraction of each deposit auto-saved into the vault.
    #[serde(default = "default_vault_ratio")]
    pub vault_ratio: f64,

    /// Fraction of the available balance withdrawable without a vote.
    #[serde(default = "default_instant_withdrawal_ratio")]
    pub instant_withdrawal_ratio: f64,

    /// Fraction of members whose approval finalizes a request.
    #[serde(default = "default_quorum_ratio")]
    pub quorum_ratio: f64,

    /// Length of the voting window in hours.
    #[serde(default = "default_voting_window_hours")]
    pub voting_window_hours: i64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// BTC price in US cents, used for fiat columns when no `--usd-price` is given.
    #[serde(default)]
    pub btc_usd_price_cents: Option<u64>,
}

fn default_vault_ratio() -> f64 {
    0.10
}

fn default_instant_withdrawal_ratio() -> f64 {
    0.20
}

fn default_quorum_ratio() -> f64 {
    0.60
}

fn default_voting_window_hours() -> i64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PolicyFile {
    fn default() -> Self {
        Self {
            vault_ratio: default_vault_ratio(),
            instant_withdrawal_ratio: default_instant_withdrawal_ratio(),
            quorum_ratio: default_quorum_ratio(),
            voting_window_hours: default_voting_window_hours(),
            log_level: default_log_level(),
            btc_usd_price_cents: None,
        }
    }
}

impl PolicyFile {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: PolicyFile = toml::from_str(contents)?;
        Ok(config)
    }

    /// Validate into an engine policy.
    pub fn to_policy(&self) -> Result<PolicyConfig, Box<dyn std::error::Error>> {
        let window_secs = self
            .voting_window_hours
            .checked_mul(3_600)
            .ok_or("voting_window_hours is too large")?;
        Ok(PolicyConfig::from_fractions(
            self.vault_ratio,
            self.instant_withdrawal_ratio,
            self.quorum_ratio,
            window_secs,
        )?)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}
