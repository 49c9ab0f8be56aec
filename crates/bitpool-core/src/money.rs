// crates/bitpool-core/src/money.rs
//
// Bitcoin amounts in satoshis.
//
// 1 BTC = 10^8 sats. All accounting uses integer sats; decimal BTC strings
// are parsed digit by digit so that no amount ever passes through a float.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::BitPoolError;

/// Number of satoshis in one BTC.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Number of fractional BTC digits representable in sats.
pub const BTC_DECIMALS: usize = 8;

/// A non-negative bitcoin amount in satoshis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sats(pub u64);

impl Sats {
    /// Zero sats.
    pub const ZERO: Sats = Sats(0);

    /// Create an amount from a raw satoshi count.
    pub fn from_sats(sats: u64) -> Self {
        Self(sats)
    }

    /// Create an amount from whole BTC.
    ///
    /// Returns `None` on overflow.
    pub fn from_whole_btc(btc: u64) -> Option<Self> {
        btc.checked_mul(SATS_PER_BTC).map(Self)
    }

    /// Parse a decimal BTC string such as `"0.625"` or `"12"`.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidAmount` for empty input, signs, more than
    /// eight fractional digits, non-digit characters, or overflow.
    pub fn parse_btc(input: &str) -> Result<Self, BitPoolError> {
        let s = input.trim();
        let malformed = || BitPoolError::InvalidAmount(format!("malformed BTC amount '{}'", input));

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }
        if frac.len() > BTC_DECIMALS {
            return Err(BitPoolError::InvalidAmount(format!(
                "'{}' has more than {} decimal places",
                input, BTC_DECIMALS
            )));
        }

        let whole_sats = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .ok()
                .and_then(|w| w.checked_mul(SATS_PER_BTC))
                .ok_or_else(malformed)?
        };
        let frac_sats = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = BTC_DECIMALS);
            padded.parse::<u64>().map_err(|_| malformed())?
        };

        whole_sats
            .checked_add(frac_sats)
            .map(Self)
            .ok_or_else(malformed)
    }

    /// Raw satoshi count.
    pub fn as_sats(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Sats) -> Option<Sats> {
        self.0.checked_add(rhs.0).map(Sats)
    }

    pub fn checked_sub(self, rhs: Sats) -> Option<Sats> {
        self.0.checked_sub(rhs.0).map(Sats)
    }

    /// Render with a fixed number of BTC decimals (0..=8), rounding half-up.
    ///
    /// `Sats(62_500_000).to_btc_fixed(6)` is `"0.625000"`.
    pub fn to_btc_fixed(&self, decimals: usize) -> String {
        let decimals = decimals.min(BTC_DECIMALS);
        let scale = 10u64.pow((BTC_DECIMALS - decimals) as u32);
        let units = (self.0 as u128 + (scale as u128 / 2)) / scale as u128;
        let per_btc = (SATS_PER_BTC / scale) as u128;
        let whole = units / per_btc;
        if decimals == 0 {
            return whole.to_string();
        }
        let frac = units % per_btc;
        format!("{}.{:0width$}", whole, frac, width = decimals)
    }

    /// Fiat value in cents for a price quoted in cents per BTC (floored).
    pub fn fiat_cents(&self, price_cents_per_btc: u64) -> u64 {
        let cents = self.0 as u128 * price_cents_per_btc as u128 / SATS_PER_BTC as u128;
        u64::try_from(cents).unwrap_or(u64::MAX)
    }
}

impl Add for Sats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Sats {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Sats {
    fn sum<I: Iterator<Item = Sats>>(iter: I) -> Self {
        iter.fold(Sats::ZERO, |acc, x| acc + x)
    }
}

impl FromStr for Sats {
    type Err = BitPoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sats::parse_btc(s)
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SATS_PER_BTC;
        let frac = self.0 % SATS_PER_BTC;
        if frac == 0 {
            write!(f, "{} BTC", whole)
        } else {
            let frac_str = format!("{:08}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} BTC", whole, trimmed)
        }
    }
}

/// Format a cent amount as US dollars with thousands separators: `$26,875.00`.
pub fn format_usd_cents(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}.{:02}", grouped, cents % 100)
}
