// crates/bitpool-policy/src/lib.rs
//
// bitpool-policy: the Treasury Policy Engine for BitPool savings groups.
//
//   - Deposit Splitter:  divides each deposit between available funds and the vault.
//   - Withdrawal Gate:   classifies a withdrawal as instant, vote-gated, or refused.
//   - Vote Resolver:     records votes and resolves requests to
//                        approved / rejected / expired.
//
// Every function is a pure computation over explicit inputs, including the
// current time. Durable state lives with the caller's ledger.

pub mod activity;
pub mod deposit;
pub mod engine;
pub mod gate;
pub mod vote;

// Re-export key types for ergonomic access from downstream crates.
pub use activity::{
    deposit_activity, instant_withdrawal_activity, request_activity, ActivityEntry, ActivityKind,
    ActivityStatus, AUTO_SAVE_MEMBER,
};
pub use deposit::split;
pub use engine::PolicyEngine;
pub use gate::{evaluate, instant_threshold, GateDecision, RejectionReason};
pub use vote::{cast_vote, progress, required_votes, resolve, VoteProgress};
