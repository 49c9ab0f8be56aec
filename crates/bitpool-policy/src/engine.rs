// crates/bitpool-policy/src/engine.rs
//
// Treasury Policy Engine: one validated policy plus the splitter, gate and
// resolver bound to it.

use chrono::{DateTime, Utc};

use bitpool_core::{
    Balance, BitPoolError, DepositSplit, MemberId, MembershipProvider, PolicyConfig,
    RequestStatus, Sats, VoteChoice, WithdrawalRequest,
};

use crate::deposit;
use crate::gate::{self, GateDecision, RejectionReason};
use crate::vote::{self, VoteProgress};

/// Stateless facade over the policy functions.
///
/// Holds no mutable state; cloning or sharing it across threads is free of
/// coordination.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// See [`deposit::split`].
    pub fn split(&self, amount: Sats) -> Result<DepositSplit, BitPoolError> {
        deposit::split(amount, &self.config)
    }

    /// See [`gate::evaluate`].
    pub fn evaluate(&self, requested: Sats, balance: &Balance) -> Result<GateDecision, BitPoolError> {
        gate::evaluate(requested, balance, &self.config)
    }

    /// See [`gate::instant_threshold`].
    pub fn instant_threshold(&self, balance: &Balance) -> Sats {
        gate::instant_threshold(balance, &self.config)
    }

    /// Run the gate and, if a vote is needed, open a pending request.
    ///
    /// The member count is snapshotted from `members` at this point.
    ///
    /// # Errors
    /// - `BitPoolError::UnknownMember` if the requester is not a member.
    /// - `BitPoolError::InvalidAmount` for a zero amount.
    /// - `BitPoolError::InsufficientFunds` if the amount exceeds `available`.
    /// - `BitPoolError::RequestNotRequired` if the amount is instant.
    /// - `BitPoolError::EmptyMembership` if there are no members.
    pub fn open_request<M>(
        &self,
        requester: MemberId,
        amount: Sats,
        reason: impl Into<String>,
        balance: &Balance,
        members: &M,
        now: DateTime<Utc>,
    ) -> Result<WithdrawalRequest, BitPoolError>
    where
        M: MembershipProvider + ?Sized,
    {
        if !members.is_member(&requester) {
            return Err(BitPoolError::UnknownMember(requester.to_string()));
        }

        match self.evaluate(amount, balance)? {
            GateDecision::Instant => Err(BitPoolError::RequestNotRequired(amount)),
            GateDecision::Rejected(RejectionReason::InsufficientFunds) => {
                Err(BitPoolError::InsufficientFunds {
                    requested: amount,
                    available: balance.available,
                })
            }
            GateDecision::RequiresVote => {
                let total_members = u32::try_from(members.member_count()).map_err(|_| {
                    BitPoolError::InvalidConfig("member count exceeds u32".to_string())
                })?;
                let request =
                    WithdrawalRequest::new(requester, amount, reason, total_members, now)?;
                tracing::info!(
                    "Opened request {} for {} by {} ({} members)",
                    request.id,
                    request.amount,
                    request.requester,
                    request.total_members
                );
                Ok(request)
            }
        }
    }

    /// See [`vote::cast_vote`].
    pub fn cast_vote<M>(
        &self,
        request: &WithdrawalRequest,
        member: &MemberId,
        choice: VoteChoice,
        members: &M,
        now: DateTime<Utc>,
    ) -> Result<WithdrawalRequest, BitPoolError>
    where
        M: MembershipProvider + ?Sized,
    {
        vote::cast_vote(request, member, choice, members, now)
    }

    /// Cast a vote and immediately recompute the status.
    pub fn vote_and_resolve<M>(
        &self,
        request: &WithdrawalRequest,
        member: &MemberId,
        choice: VoteChoice,
        members: &M,
        now: DateTime<Utc>,
    ) -> Result<WithdrawalRequest, BitPoolError>
    where
        M: MembershipProvider + ?Sized,
    {
        let voted = self.cast_vote(request, member, choice, members, now)?;
        Ok(self.resolve(&voted, now))
    }

    /// See [`vote::resolve`].
    pub fn resolve(&self, request: &WithdrawalRequest, now: DateTime<Utc>) -> WithdrawalRequest {
        vote::resolve(request, &self.config, now)
    }

    /// See [`vote::progress`].
    pub fn progress(&self, request: &WithdrawalRequest, now: DateTime<Utc>) -> VoteProgress {
        vote::progress(request, &self.config, now)
    }

    /// Balance after paying out an approved request.
    ///
    /// # Errors
    /// - `BitPoolError::NotApproved` unless the request is `Approved`.
    /// - `BitPoolError::InsufficientFunds` if the available balance no longer
    ///   covers the amount.
    pub fn settle(&self, request: &WithdrawalRequest, balance: &Balance) -> Result<Balance, BitPoolError> {
        if request.status != RequestStatus::Approved {
            return Err(BitPoolError::NotApproved {
                id: request.id.to_string(),
                status: request.status.to_string(),
            });
        }
        let mut next = *balance;
        next.apply_withdrawal(request.amount)?;
        Ok(next)
    }
}
