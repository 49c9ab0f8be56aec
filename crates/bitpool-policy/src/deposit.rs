// crates/bitpool-policy/src/deposit.rs
//
// Deposit Splitter.
//
// Each deposit is divided between the spendable balance and the vault:
//   vault     = round(amount * vault_ratio)
//   available = amount - vault
//
// `available` is derived by subtraction, never by a second rounding, so the
// two portions always sum to the deposit exactly.

use bitpool_core::{BitPoolError, DepositSplit, PolicyConfig, Sats};

/// Split a deposit according to the configured vault ratio.
///
/// Pure: the caller applies the result with `Balance::apply_deposit`.
///
/// # Errors
/// Returns `BitPoolError::InvalidAmount` if `amount` is zero.
pub fn split(amount: Sats, config: &PolicyConfig) -> Result<DepositSplit, BitPoolError> {
    if amount.is_zero() {
        return Err(BitPoolError::InvalidAmount(
            "deposit amount must be greater than zero".to_string(),
        ));
    }

    let vault = Sats(config.vault_ratio().mul_round(amount.as_sats()));
    let available = amount - vault;

    tracing::debug!(
        "Deposit of {} split: {} available, {} vault ({})",
        amount,
        available,
        vault,
        config.vault_ratio()
    );

    Ok(DepositSplit { available, vault })
}
