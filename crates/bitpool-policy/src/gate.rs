// crates/bitpool-policy/src/gate.rs
//
// Withdrawal Gate.
//
// Classifies a withdrawal against the current balance:
//   1. requested > available            -> Rejected(InsufficientFunds)
//   2. requested <= threshold           -> Instant
//   3. otherwise                        -> RequiresVote
// where threshold = floor(available * instant_withdrawal_ratio).
//
// The funds check runs first, so an over-balance request is rejected even
// when it is also over the threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

use bitpool_core::{Balance, BitPoolError, PolicyConfig, Sats};

/// Why a withdrawal was refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Requested more than the available balance.
    InsufficientFunds,
}

/// Outcome of evaluating a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Within the instant threshold and the available balance.
    Instant,
    /// Over the threshold but covered by the available balance.
    RequiresVote,
    /// Refused without a vote.
    Rejected(RejectionReason),
}

impl GateDecision {
    pub fn is_instant(&self) -> bool {
        matches!(self, GateDecision::Instant)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Instant => write!(f, "instant"),
            GateDecision::RequiresVote => write!(f, "requires vote"),
            GateDecision::Rejected(RejectionReason::InsufficientFunds) => {
                write!(f, "rejected (insufficient funds)")
            }
        }
    }
}

/// Largest amount withdrawable without a vote:
/// `floor(available * instant_withdrawal_ratio)`.
pub fn instant_threshold(balance: &Balance, config: &PolicyConfig) -> Sats {
    Sats(
        config
            .instant_withdrawal_ratio()
            .mul_floor(balance.available.as_sats()),
    )
}

/// Classify a withdrawal of `requested` against `balance`.
///
/// Pure: on `RequiresVote` the caller opens a pending `WithdrawalRequest`.
///
/// # Errors
/// Returns `BitPoolError::InvalidAmount` if `requested` is zero.
pub fn evaluate(
    requested: Sats,
    balance: &Balance,
    config: &PolicyConfig,
) -> Result<GateDecision, BitPoolError> {
    if requested.is_zero() {
        return Err(BitPoolError::InvalidAmount(
            "withdrawal amount must be greater than zero".to_string(),
        ));
    }

    if requested > balance.available {
        tracing::debug!(
            "Withdrawal of {} exceeds available balance {}",
            requested,
            balance.available
        );
        return Ok(GateDecision::Rejected(RejectionReason::InsufficientFunds));
    }

    let threshold = instant_threshold(balance, config);
    let decision = if requested <= threshold {
        GateDecision::Instant
    } else {
        GateDecision::RequiresVote
    };

    tracing::debug!(
        "Withdrawal of {} against threshold {}: {}",
        requested,
        threshold,
        decision
    );

    Ok(decision)
}
