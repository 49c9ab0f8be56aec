// crates/bitpool-core/src/error.rs

use thiserror::Error;

use crate::money::Sats;

/// Errors surfaced by the BitPool policy engine.
///
/// Every variant is returned at the point where the violated precondition is
/// detected. Nothing is retried or swallowed inside the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitPoolError {
    /// Non-positive or malformed quantity.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Withdrawal exceeds the available (non-vault) balance.
    #[error("Insufficient funds: requested {requested} but only {available} available")]
    InsufficientFunds { requested: Sats, available: Sats },

    /// Vote cast on, or settlement attempted against, a terminal request.
    #[error("Request {0} is already finalized")]
    AlreadyFinalized(String),

    /// Identity is not in the eligible member set.
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    /// Ratio outside its bounds or non-positive voting window.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A vote request cannot be opened against zero members.
    #[error("Membership is empty: a withdrawal vote needs at least one member")]
    EmptyMembership,

    /// Amount is within the instant threshold, so no vote is needed.
    #[error("Withdrawal of {0} is within the instant threshold and does not require a vote")]
    RequestNotRequired(Sats),

    /// Settlement of a request that did not reach approval.
    #[error("Request {id} is not approved (status: {status})")]
    NotApproved { id: String, status: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BitPoolError {
    fn from(e: serde_json::Error) -> Self {
        BitPoolError::Serialization(e.to_string())
    }
}
