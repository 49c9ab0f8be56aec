// crates/bitpool-policy/src/activity.rs
//
// Activity records for the pool's recent-activity feed.
//
// These are plain values built from engine outcomes. Storing and ordering
// them is the ledger's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use bitpool_core::{DepositSplit, MemberId, RequestStatus, Sats, WithdrawalRequest};

/// Attribution used for automatic vault savings.
pub const AUTO_SAVE_MEMBER: &str = "Auto-save";

/// Kind of balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Member deposit (full amount, before the vault split).
    Deposit,
    /// Portion of a deposit auto-saved into the vault.
    VaultDeposit,
    /// Funds leaving the available balance.
    Withdrawal,
}

impl ActivityKind {
    /// `+` for money coming in, `-` for money going out.
    pub fn sign(&self) -> char {
        match self {
            ActivityKind::Deposit | ActivityKind::VaultDeposit => '+',
            ActivityKind::Withdrawal => '-',
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ActivityKind::Deposit => "Deposited",
            ActivityKind::VaultDeposit => "Auto-saved to vault",
            ActivityKind::Withdrawal => "Withdrew",
        }
    }
}

/// Settlement state of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Completed,
    Pending,
    Approved,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::Completed => write!(f, "completed"),
            ActivityStatus::Pending => write!(f, "pending"),
            ActivityStatus::Approved => write!(f, "approved"),
        }
    }
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub amount: Sats,
    pub member: MemberId,
    pub timestamp: DateTime<Utc>,
    pub status: ActivityStatus,
}

impl ActivityEntry {
    fn new(
        kind: ActivityKind,
        amount: Sats,
        member: MemberId,
        timestamp: DateTime<Utc>,
        status: ActivityStatus,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            amount,
            member,
            timestamp,
            status,
        }
    }

    /// Signed amount for display, e.g. `+0.05 BTC`.
    pub fn signed_amount(&self) -> String {
        format!("{}{}", self.kind.sign(), self.amount)
    }
}

/// Entries for a deposit: the deposit itself plus the vault auto-save when
/// the vault portion is non-zero.
pub fn deposit_activity(
    member: &MemberId,
    split: &DepositSplit,
    now: DateTime<Utc>,
) -> Vec<ActivityEntry> {
    let mut entries = vec![ActivityEntry::new(
        ActivityKind::Deposit,
        split.total(),
        member.clone(),
        now,
        ActivityStatus::Completed,
    )];
    if !split.vault.is_zero() {
        entries.push(ActivityEntry::new(
            ActivityKind::VaultDeposit,
            split.vault,
            MemberId::from(AUTO_SAVE_MEMBER),
            now,
            ActivityStatus::Completed,
        ));
    }
    entries
}

/// Entry for a withdrawal that cleared the instant threshold.
pub fn instant_withdrawal_activity(
    member: &MemberId,
    amount: Sats,
    now: DateTime<Utc>,
) -> ActivityEntry {
    ActivityEntry::new(
        ActivityKind::Withdrawal,
        amount,
        member.clone(),
        now,
        ActivityStatus::Completed,
    )
}

/// Entry for a vote-gated withdrawal.
///
/// Pending requests show as pending and approved ones as approved. Rejected
/// and expired requests move no funds and produce no entry.
pub fn request_activity(request: &WithdrawalRequest) -> Option<ActivityEntry> {
    let (status, timestamp) = match request.status {
        RequestStatus::Pending => (ActivityStatus::Pending, request.created_at),
        RequestStatus::Approved => (
            ActivityStatus::Approved,
            request.resolved_at.unwrap_or(request.updated_at),
        ),
        RequestStatus::Rejected | RequestStatus::Expired => return None,
    };
    Some(ActivityEntry::new(
        ActivityKind::Withdrawal,
        request.amount,
        request.requester.clone(),
        timestamp,
        status,
    ))
}
