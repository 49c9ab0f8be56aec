// crates/bitpool-core/src/balance.rs
//
// Pool balance: spendable `available` funds plus the locked `vault`.
//
// Mutated only by deposits (both parts grow per the deposit split) and by
// withdrawals (instant or vote-approved), which draw on `available` alone.
// The vault is never withdrawable.

use serde::{Deserialize, Serialize};

use crate::error::BitPoolError;
use crate::money::Sats;

/// How a single deposit divides between the available balance and the vault.
///
/// The two portions always sum to the deposited amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSplit {
    /// Portion credited to the spendable balance.
    pub available: Sats,
    /// Portion auto-saved into the vault.
    pub vault: Sats,
}

impl DepositSplit {
    /// The full deposited amount.
    pub fn total(&self) -> Sats {
        self.available + self.vault
    }
}

/// Balance of the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Spendable funds.
    pub available: Sats,
    /// Locked savings.
    pub vault: Sats,
}

impl Balance {
    /// Create an empty balance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a balance from existing ledger values.
    pub fn with_amounts(available: Sats, vault: Sats) -> Self {
        Self { available, vault }
    }

    /// `available + vault`.
    pub fn total(&self) -> Sats {
        self.available + self.vault
    }

    /// Credit a deposit split to both parts.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidAmount` if either part would overflow.
    /// The balance is unchanged on error.
    pub fn apply_deposit(&mut self, split: &DepositSplit) -> Result<(), BitPoolError> {
        let overflow = || BitPoolError::InvalidAmount("deposit overflows the balance".to_string());
        let available = self.available.checked_add(split.available).ok_or_else(overflow)?;
        let vault = self.vault.checked_add(split.vault).ok_or_else(overflow)?;
        self.available = available;
        self.vault = vault;
        Ok(())
    }

    /// Debit a withdrawal from the available balance.
    ///
    /// Used for both instant withdrawals and approved vote requests.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidAmount` for a zero amount and
    /// `BitPoolError::InsufficientFunds` if the amount exceeds `available`.
    /// The balance is unchanged on error.
    pub fn apply_withdrawal(&mut self, amount: Sats) -> Result<(), BitPoolError> {
        if amount.is_zero() {
            return Err(BitPoolError::InvalidAmount(
                "withdrawal amount must be greater than zero".to_string(),
            ));
        }
        self.available = self
            .available
            .checked_sub(amount)
            .ok_or(BitPoolError::InsufficientFunds {
                requested: amount,
                available: self.available,
            })?;
        Ok(())
    }
}
