// crates/bitpool-core/src/request.rs
//
// Withdrawal requests that need a member vote.
//
// Lifecycle:
//
//   Pending --> Approved
//      |
//      +-----> Rejected
//      |
//      +-----> Expired
//
// All three outcomes are terminal; a terminal request is never mutated again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::error::BitPoolError;
use crate::identity::{MemberId, RequestId};
use crate::money::Sats;

/// Status of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Accepting votes.
    Pending,
    /// Enough members voted for the withdrawal.
    Approved,
    /// Approval became impossible given the votes against.
    Rejected,
    /// The voting window closed without a decision.
    Expired,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
            RequestStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A member's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    For,
    Against,
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteChoice::For => write!(f, "for"),
            VoteChoice::Against => write!(f, "against"),
        }
    }
}

/// A withdrawal above the instant threshold, put to a member vote.
///
/// Deserializing checks the same invariants as `new`, plus disjoint vote sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RequestRecord")]
pub struct WithdrawalRequest {
    /// Unique identifier (UUID v7).
    pub id: RequestId,
    /// Member asking for the funds.
    pub requester: MemberId,
    /// Requested amount.
    pub amount: Sats,
    /// Free-text justification shown to voters.
    pub reason: String,
    /// When the request was opened; the voting window starts here.
    pub created_at: DateTime<Utc>,
    /// Last vote cast or status change.
    pub updated_at: DateTime<Utc>,
    /// When the request reached a terminal status.
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Members voting for. Disjoint from `votes_against`.
    pub votes_for: BTreeSet<MemberId>,
    /// Members voting against. Disjoint from `votes_for`.
    pub votes_against: BTreeSet<MemberId>,
    /// Member count at creation. Later membership changes do not move the quorum base.
    pub total_members: u32,
    /// Current status.
    pub status: RequestStatus,
}

/// Unvalidated wire form of a `WithdrawalRequest`.
#[derive(Deserialize)]
struct RequestRecord {
    id: RequestId,
    requester: MemberId,
    amount: Sats,
    reason: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    resolved_at: Option<DateTime<Utc>>,
    votes_for: BTreeSet<MemberId>,
    votes_against: BTreeSet<MemberId>,
    total_members: u32,
    status: RequestStatus,
}

impl TryFrom<RequestRecord> for WithdrawalRequest {
    type Error = BitPoolError;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        if record.amount.is_zero() {
            return Err(BitPoolError::InvalidAmount(format!(
                "request {} has a zero amount",
                record.id
            )));
        }
        if record.total_members == 0 {
            return Err(BitPoolError::EmptyMembership);
        }
        if let Some(member) = record.votes_for.intersection(&record.votes_against).next() {
            return Err(BitPoolError::Serialization(format!(
                "request {}: {} voted both for and against",
                record.id, member
            )));
        }
        Ok(Self {
            id: record.id,
            requester: record.requester,
            amount: record.amount,
            reason: record.reason,
            created_at: record.created_at,
            updated_at: record.updated_at,
            resolved_at: record.resolved_at,
            votes_for: record.votes_for,
            votes_against: record.votes_against,
            total_members: record.total_members,
            status: record.status,
        })
    }
}

impl WithdrawalRequest {
    /// Open a new pending request.
    ///
    /// # Errors
    /// Returns `BitPoolError::InvalidAmount` for a zero amount and
    /// `BitPoolError::EmptyMembership` when `total_members` is zero.
    pub fn new(
        requester: MemberId,
        amount: Sats,
        reason: impl Into<String>,
        total_members: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BitPoolError> {
        if amount.is_zero() {
            return Err(BitPoolError::InvalidAmount(
                "requested amount must be greater than zero".to_string(),
            ));
        }
        if total_members == 0 {
            return Err(BitPoolError::EmptyMembership);
        }
        Ok(Self {
            id: Uuid::now_v7(),
            requester,
            amount,
            reason: reason.into(),
            created_at,
            updated_at: created_at,
            resolved_at: None,
            votes_for: BTreeSet::new(),
            votes_against: BTreeSet::new(),
            total_members,
            status: RequestStatus::Pending,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// End of the voting window for a given window length.
    ///
    /// Saturates at the latest representable time instead of overflowing.
    pub fn voting_deadline(&self, window: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The vote currently recorded for `member`, if any.
    pub fn vote_of(&self, member: &MemberId) -> Option<VoteChoice> {
        if self.votes_for.contains(member) {
            Some(VoteChoice::For)
        } else if self.votes_against.contains(member) {
            Some(VoteChoice::Against)
        } else {
            None
        }
    }

    /// Number of members who have voted either way.
    pub fn votes_cast(&self) -> usize {
        self.votes_for.len() + self.votes_against.len()
    }
}
