// crates/bitpool-core/src/lib.rs
//
// bitpool-core: Core types, errors, and collaborator traits for the BitPool
// treasury policy engine.
//
// This is the leaf crate of the workspace. It defines money, identities,
// policy configuration, balances, withdrawal requests, and the traits through
// which callers supply membership. All amounts are integer satoshis.

pub mod balance;
pub mod error;
pub mod identity;
pub mod money;
pub mod policy;
pub mod request;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use bitpool_core::Sats;`

// Money
pub use money::{format_usd_cents, Sats, BTC_DECIMALS, SATS_PER_BTC};

// Identity
pub use identity::{MemberId, MemberRoster, RequestId};

// Policy
pub use policy::{PolicyConfig, Ratio, BPS_SCALE, MAX_VOTING_WINDOW_SECS};

// Balance
pub use balance::{Balance, DepositSplit};

// Requests
pub use request::{RequestStatus, VoteChoice, WithdrawalRequest};

// Error type
pub use error::BitPoolError;

// Traits
pub use traits::MembershipProvider;
