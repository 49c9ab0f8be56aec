// crates/bitpool-core/src/policy.rs
//
// Group protection rules: vault ratio, instant-withdrawal ratio, quorum and
// voting window.
//
// Ratios are fixed-point basis points (1 bps = 0.01%), so every policy
// computation over sats stays in integer arithmetic.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BitPoolError;

/// Basis points in a whole (100%).
pub const BPS_SCALE: u32 = 10_000;

/// Default share of each deposit auto-saved into the vault: 10%.
pub const DEFAULT_VAULT_BPS: u32 = 1_000;

/// Default share of the available balance withdrawable without a vote: 20%.
pub const DEFAULT_INSTANT_WITHDRAWAL_BPS: u32 = 2_000;

/// Default share of members whose approval finalizes a request: 60%.
pub const DEFAULT_QUORUM_BPS: u32 = 6_000;

/// Default voting window: 24 hours.
pub const DEFAULT_VOTING_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Longest accepted voting window: 365 days.
pub const MAX_VOTING_WINDOW_SECS: i64 = 365 * DEFAULT_VOTING_WINDOW_SECS;

// Slack for binary float noise when checking that a fraction is a whole
// number of basis points (0.6 * 10_000 is 6000.000000000001).
const BPS_TOLERANCE: f64 = 1e-6;

/// A fraction in [0, 1], stored in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Ratio(u32);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);
    pub const ONE: Ratio = Ratio(BPS_SCALE);

    /// Build a ratio from basis points (0..=10_000).
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidConfig` above 10_000 bps.
    pub fn from_bps(bps: u32) -> Result<Self, BitPoolError> {
        if bps > BPS_SCALE {
            return Err(BitPoolError::InvalidConfig(format!(
                "ratio of {} bps exceeds 100%",
                bps
            )));
        }
        Ok(Self(bps))
    }

    /// Build a ratio from a fraction that is a whole number of basis points.
    ///
    /// A fraction finer than 0.0001 is refused rather than rounded, since
    /// rounding would shift the floor/ceil results derived from it.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidConfig` for NaN, values outside [0, 1],
    /// or values with more precision than one basis point.
    pub fn from_fraction(fraction: f64) -> Result<Self, BitPoolError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(BitPoolError::InvalidConfig(format!(
                "ratio {} is outside [0, 1]",
                fraction
            )));
        }
        let scaled = fraction * BPS_SCALE as f64;
        let bps = scaled.round();
        if (scaled - bps).abs() > BPS_TOLERANCE {
            return Err(BitPoolError::InvalidConfig(format!(
                "ratio {} is finer than one basis point (0.0001)",
                fraction
            )));
        }
        Ok(Self(bps as u32))
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / BPS_SCALE as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `round(value * ratio)`, half-up.
    pub fn mul_round(&self, value: u64) -> u64 {
        self.scaled(value, BPS_SCALE as u128 / 2)
    }

    /// `floor(value * ratio)`.
    pub fn mul_floor(&self, value: u64) -> u64 {
        self.scaled(value, 0)
    }

    /// `ceil(value * ratio)`.
    pub fn mul_ceil(&self, value: u64) -> u64 {
        self.scaled(value, BPS_SCALE as u128 - 1)
    }

    // ratio <= 1, so the result never exceeds `value` and fits in u64.
    fn scaled(&self, value: u64, bias: u128) -> u64 {
        ((value as u128 * self.0 as u128 + bias) / BPS_SCALE as u128) as u64
    }
}

impl TryFrom<u32> for Ratio {
    type Error = BitPoolError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Ratio::from_bps(bps)
    }
}

impl From<Ratio> for u32 {
    fn from(ratio: Ratio) -> u32 {
        ratio.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            let frac_str = format!("{:02}", frac);
            write!(f, "{}.{}%", whole, frac_str.trim_end_matches('0'))
        }
    }
}

/// Immutable policy configuration shared read-only by every computation.
///
/// Only constructed through `new`/`from_fractions`/`default`, so a value of
/// this type always satisfies the bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyConfig {
    vault_ratio: Ratio,
    instant_withdrawal_ratio: Ratio,
    quorum_ratio: Ratio,
    #[serde(serialize_with = "serialize_window_secs", rename = "voting_window_secs")]
    voting_window: Duration,
}

impl PolicyConfig {
    /// Build a validated policy.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidConfig` if the quorum ratio is zero or the
    /// voting window is not in (0, 365 days]. The other ratios are bounded by
    /// `Ratio`.
    pub fn new(
        vault_ratio: Ratio,
        instant_withdrawal_ratio: Ratio,
        quorum_ratio: Ratio,
        voting_window: Duration,
    ) -> Result<Self, BitPoolError> {
        if quorum_ratio.is_zero() {
            return Err(BitPoolError::InvalidConfig(
                "quorum ratio must be greater than 0".to_string(),
            ));
        }
        if voting_window <= Duration::zero() {
            return Err(BitPoolError::InvalidConfig(format!(
                "voting window must be positive, got {}s",
                voting_window.num_seconds()
            )));
        }
        if voting_window > Duration::seconds(MAX_VOTING_WINDOW_SECS) {
            return Err(BitPoolError::InvalidConfig(format!(
                "voting window of {}s exceeds the {}s maximum",
                voting_window.num_seconds(),
                MAX_VOTING_WINDOW_SECS
            )));
        }
        Ok(Self {
            vault_ratio,
            instant_withdrawal_ratio,
            quorum_ratio,
            voting_window,
        })
    }

    /// Build a validated policy from plain fractions and a window in seconds.
    pub fn from_fractions(
        vault: f64,
        instant_withdrawal: f64,
        quorum: f64,
        voting_window_secs: i64,
    ) -> Result<Self, BitPoolError> {
        let voting_window = Duration::try_seconds(voting_window_secs).ok_or_else(|| {
            BitPoolError::InvalidConfig(format!(
                "voting window of {}s is out of range",
                voting_window_secs
            ))
        })?;
        Self::new(
            Ratio::from_fraction(vault)?,
            Ratio::from_fraction(instant_withdrawal)?,
            Ratio::from_fraction(quorum)?,
            voting_window,
        )
    }

    /// Fraction of each deposit auto-saved into the vault.
    pub fn vault_ratio(&self) -> Ratio {
        self.vault_ratio
    }

    /// Fraction of the available balance withdrawable without a vote.
    pub fn instant_withdrawal_ratio(&self) -> Ratio {
        self.instant_withdrawal_ratio
    }

    /// Fraction of members whose approval finalizes a request.
    pub fn quorum_ratio(&self) -> Ratio {
        self.quorum_ratio
    }

    pub fn voting_window(&self) -> Duration {
        self.voting_window
    }

    /// One-line description of the active protection rules.
    pub fn rules_summary(&self) -> String {
        format!(
            "Max withdrawal: {} \u{2022} Auto-vault: {} \u{2022} Requires {} approval for large amounts",
            self.instant_withdrawal_ratio, self.vault_ratio, self.quorum_ratio
        )
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            vault_ratio: Ratio(DEFAULT_VAULT_BPS),
            instant_withdrawal_ratio: Ratio(DEFAULT_INSTANT_WITHDRAWAL_BPS),
            quorum_ratio: Ratio(DEFAULT_QUORUM_BPS),
            voting_window: Duration::seconds(DEFAULT_VOTING_WINDOW_SECS),
        }
    }
}

fn serialize_window_secs<S: serde::Serializer>(window: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(window.num_seconds())
}
