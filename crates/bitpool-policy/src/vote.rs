// crates/bitpool-policy/src/vote.rs
//
// Vote Resolver.
//
// State machine per withdrawal request:
//
//   Pending --(|for| >= required)---------------------> Approved
//   Pending --(|against| > total - required)----------> Rejected
//   Pending --(now >= created_at + voting_window)-----> Expired
//
// where required = ceil(total_members * quorum_ratio). The checks run in that
// order, so a request that reaches quorum exactly as its window closes is
// Approved. Terminal requests are never changed.
//
// Every function here is pure: the request is read by reference and the next
// state is returned as a new value for the caller to persist.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use bitpool_core::{
    BitPoolError, MemberId, MembershipProvider, PolicyConfig, Ratio, RequestStatus, VoteChoice,
    WithdrawalRequest,
};

/// Number of approvals that finalize a request: `ceil(total_members * quorum)`.
pub fn required_votes(total_members: u32, quorum: Ratio) -> u32 {
    quorum.mul_ceil(total_members as u64) as u32
}

/// Record `member`'s vote on `request`.
///
/// A member holds at most one vote: re-voting removes any earlier vote before
/// recording the new one, so repeated votes are never double-counted. The
/// status is not recomputed here; call [`resolve`] afterwards.
///
/// # Errors
/// - `BitPoolError::AlreadyFinalized` if the request is terminal.
/// - `BitPoolError::UnknownMember` if `member` is not eligible.
pub fn cast_vote<M>(
    request: &WithdrawalRequest,
    member: &MemberId,
    choice: VoteChoice,
    members: &M,
    now: DateTime<Utc>,
) -> Result<WithdrawalRequest, BitPoolError>
where
    M: MembershipProvider + ?Sized,
{
    if request.is_terminal() {
        tracing::warn!(
            "Vote by {} on request {} refused: already {}",
            member,
            request.id,
            request.status
        );
        return Err(BitPoolError::AlreadyFinalized(request.id.to_string()));
    }
    if !members.is_member(member) {
        tracing::warn!(
            "Vote on request {} refused: {} is not a member",
            request.id,
            member
        );
        return Err(BitPoolError::UnknownMember(member.to_string()));
    }

    let mut next = request.clone();
    next.votes_for.remove(member);
    next.votes_against.remove(member);
    match choice {
        VoteChoice::For => next.votes_for.insert(member.clone()),
        VoteChoice::Against => next.votes_against.insert(member.clone()),
    };
    next.updated_at = now;

    tracing::debug!(
        "{} voted {} on request {} ({} for, {} against)",
        member,
        choice,
        request.id,
        next.votes_for.len(),
        next.votes_against.len()
    );

    Ok(next)
}

/// Status a pending request should have at `now`.
fn next_status(request: &WithdrawalRequest, config: &PolicyConfig, now: DateTime<Utc>) -> RequestStatus {
    let required = required_votes(request.total_members, config.quorum_ratio()) as usize;
    let total = request.total_members as usize;

    if request.votes_for.len() >= required {
        RequestStatus::Approved
    } else if request.votes_against.len() > total.saturating_sub(required) {
        RequestStatus::Rejected
    } else if now >= request.voting_deadline(config.voting_window()) {
        RequestStatus::Expired
    } else {
        RequestStatus::Pending
    }
}

/// Recompute the status of `request` at `now`.
///
/// Safe to call after every vote and on any periodic tick. Idempotent: a
/// terminal request comes back unchanged, and a request that stays pending
/// comes back identical to the input.
pub fn resolve(
    request: &WithdrawalRequest,
    config: &PolicyConfig,
    now: DateTime<Utc>,
) -> WithdrawalRequest {
    if request.is_terminal() {
        return request.clone();
    }

    let status = next_status(request, config, now);
    if status == request.status {
        return request.clone();
    }

    tracing::info!(
        "Request {} ({} by {}): {} -> {} ({} for, {} against, {} members)",
        request.id,
        request.amount,
        request.requester,
        request.status,
        status,
        request.votes_for.len(),
        request.votes_against.len(),
        request.total_members
    );

    let mut next = request.clone();
    next.status = status;
    next.updated_at = now;
    next.resolved_at = Some(now);
    next
}

/// Read-only voting progress for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteProgress {
    pub votes_for: u32,
    pub votes_against: u32,
    pub required_votes: u32,
    /// `votes_for / required_votes`. Not clamped: may exceed 1.0.
    pub fraction_complete: f64,
    /// Time left in the voting window; zero once closed or resolved.
    #[serde(serialize_with = "serialize_secs", rename = "time_remaining_secs")]
    pub time_remaining: Duration,
    pub status: RequestStatus,
}

impl VoteProgress {
    /// `fraction_complete` clamped to [0, 1] for progress bars.
    pub fn display_fraction(&self) -> f64 {
        self.fraction_complete.clamp(0.0, 1.0)
    }

    /// Human label for the remaining window, e.g. "18 hours".
    pub fn time_left_label(&self) -> String {
        if self.status.is_terminal() || self.time_remaining <= Duration::zero() {
            return "closed".to_string();
        }
        let days = self.time_remaining.num_days();
        let hours = self.time_remaining.num_hours();
        let minutes = self.time_remaining.num_minutes();
        if days >= 2 {
            format!("{} days", days)
        } else if hours >= 2 {
            format!("{} hours", hours)
        } else if hours == 1 {
            "1 hour".to_string()
        } else if minutes >= 2 {
            format!("{} minutes", minutes)
        } else if minutes == 1 {
            "1 minute".to_string()
        } else {
            "less than a minute".to_string()
        }
    }
}

/// Project the voting progress of `request` at `now`.
pub fn progress(
    request: &WithdrawalRequest,
    config: &PolicyConfig,
    now: DateTime<Utc>,
) -> VoteProgress {
    let required = required_votes(request.total_members, config.quorum_ratio());
    let votes_for = request.votes_for.len() as u32;
    let fraction_complete = if required == 0 {
        1.0
    } else {
        votes_for as f64 / required as f64
    };

    let time_remaining = if request.is_terminal() {
        Duration::zero()
    } else {
        (request.voting_deadline(config.voting_window()) - now).max(Duration::zero())
    };

    VoteProgress {
        votes_for,
        votes_against: request.votes_against.len() as u32,
        required_votes: required,
        fraction_complete,
        time_remaining,
        status: request.status,
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpool_core::{MemberRoster, Sats};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn family() -> MemberRoster {
        ["alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi"]
            .into_iter()
            .collect()
    }

    fn make_request() -> WithdrawalRequest {
        WithdrawalRequest::new(
            "carol".into(),
            Sats::parse_btc("0.2").unwrap(),
            "Emergency medical expenses",
            8,
            t0(),
        )
        .unwrap()
    }

    fn vote_all(
        mut request: WithdrawalRequest,
        voters: &[&str],
        choice: VoteChoice,
    ) -> WithdrawalRequest {
        let roster = family();
        for voter in voters {
            request = cast_vote(&request, &MemberId::from(*voter), choice, &roster, t0()).unwrap();
        }
        request
    }

    #[test]
    fn test_required_votes() {
        let sixty = Ratio::from_bps(6_000).unwrap();
        assert_eq!(required_votes(8, sixty), 5);
        assert_eq!(required_votes(5, sixty), 3);
        assert_eq!(required_votes(1, sixty), 1);
        assert_eq!(required_votes(10, sixty), 6);
        assert_eq!(required_votes(8, Ratio::ONE), 8);
        assert_eq!(required_votes(8, Ratio::from_bps(1).unwrap()), 1);
    }

    #[test]
    fn test_cast_vote_records_choice() {
        let request = make_request();
        let next = cast_vote(
            &request,
            &"alice".into(),
            VoteChoice::For,
            &family(),
            t0() + Duration::minutes(5),
        )
        .unwrap();
        assert!(next.votes_for.contains(&MemberId::from("alice")));
        assert_eq!(next.updated_at, t0() + Duration::minutes(5));
        // Input untouched.
        assert!(request.votes_for.is_empty());
    }

    #[test]
    fn test_revote_same_choice_is_not_duplicated() {
        let request = vote_all(make_request(), &["alice", "alice"], VoteChoice::For);
        assert_eq!(request.votes_for.len(), 1);
    }

    #[test]
    fn test_revote_moves_vote() {
        let request = vote_all(make_request(), &["alice"], VoteChoice::For);
        let request = vote_all(request, &["alice"], VoteChoice::Against);
        assert!(request.votes_for.is_empty());
        assert_eq!(request.votes_against.len(), 1);
        assert_eq!(request.vote_of(&"alice".into()), Some(VoteChoice::Against));
    }

    #[test]
    fn test_unknown_member_rejected() {
        let err = cast_vote(
            &make_request(),
            &"mallory".into(),
            VoteChoice::For,
            &family(),
            t0(),
        )
        .unwrap_err();
        assert_eq!(err, BitPoolError::UnknownMember("mallory".to_string()));
    }

    #[test]
    fn test_vote_on_terminal_request_rejected() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin", "frank"],
            VoteChoice::For,
        );
        let approved = resolve(&request, &config, t0());
        assert_eq!(approved.status, RequestStatus::Approved);

        let err = cast_vote(&approved, &"grace".into(), VoteChoice::Against, &family(), t0())
            .unwrap_err();
        assert!(matches!(err, BitPoolError::AlreadyFinalized(_)));
    }

    #[test]
    fn test_quorum_approves() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin", "frank"],
            VoteChoice::For,
        );
        let resolved = resolve(&request, &config, t0() + Duration::hours(1));
        assert_eq!(resolved.status, RequestStatus::Approved);
        assert_eq!(resolved.resolved_at, Some(t0() + Duration::hours(1)));
    }

    #[test]
    fn test_below_quorum_stays_pending() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin"],
            VoteChoice::For,
        );
        let resolved = resolve(&request, &config, t0() + Duration::hours(1));
        assert_eq!(resolved.status, RequestStatus::Pending);
        assert_eq!(resolved, request);
    }

    #[test]
    fn test_impossible_approval_rejects_early() {
        let config = PolicyConfig::default();
        // 8 members, 5 required: 4 against leaves only 4 possible approvals.
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin"],
            VoteChoice::Against,
        );
        let resolved = resolve(&request, &config, t0() + Duration::minutes(1));
        assert_eq!(resolved.status, RequestStatus::Rejected);
    }

    #[test]
    fn test_three_against_still_pending() {
        let config = PolicyConfig::default();
        let request = vote_all(make_request(), &["alice", "bob", "dave"], VoteChoice::Against);
        let resolved = resolve(&request, &config, t0() + Duration::minutes(1));
        assert_eq!(resolved.status, RequestStatus::Pending);
    }

    #[test]
    fn test_window_lapse_expires() {
        let config = PolicyConfig::default();
        let request = vote_all(make_request(), &["alice", "bob"], VoteChoice::For);

        let just_before = t0() + config.voting_window() - Duration::seconds(1);
        assert_eq!(resolve(&request, &config, just_before).status, RequestStatus::Pending);

        let at_deadline = t0() + config.voting_window();
        assert_eq!(resolve(&request, &config, at_deadline).status, RequestStatus::Expired);
    }

    #[test]
    fn test_quorum_wins_over_expiry() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin", "frank"],
            VoteChoice::For,
        );
        let late = t0() + config.voting_window() + Duration::hours(1);
        assert_eq!(resolve(&request, &config, late).status, RequestStatus::Approved);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let config = PolicyConfig::default();
        let request = vote_all(make_request(), &["alice", "bob", "dave", "erin"], VoteChoice::Against);
        let now = t0() + Duration::minutes(3);
        let once = resolve(&request, &config, now);
        let twice = resolve(&once, &config, now);
        assert_eq!(once, twice);

        // A later tick does not alter a terminal request either.
        let later = resolve(&once, &config, now + Duration::days(30));
        assert_eq!(later, once);
    }

    #[test]
    fn test_snapshot_member_count_is_quorum_base() {
        let config = PolicyConfig::default();
        // Roster grew to 12 after the request opened with 8.
        let mut roster = family();
        for extra in ["ivan", "judy", "mike", "niaj"] {
            roster.add(extra.into());
        }
        let mut request = make_request();
        for voter in ["alice", "bob", "ivan", "judy", "mike"] {
            request = cast_vote(&request, &voter.into(), VoteChoice::For, &roster, t0()).unwrap();
        }
        // 5 of the snapshotted base of 8 still meets quorum.
        assert_eq!(resolve(&request, &config, t0()).status, RequestStatus::Approved);
    }

    #[test]
    fn test_progress() {
        let config = PolicyConfig::default();
        let request = vote_all(make_request(), &["alice", "bob", "dave"], VoteChoice::For);
        let request = vote_all(request, &["erin"], VoteChoice::Against);
        let now = t0() + Duration::hours(6);
        let p = progress(&request, &config, now);
        assert_eq!(p.votes_for, 3);
        assert_eq!(p.votes_against, 1);
        assert_eq!(p.required_votes, 5);
        assert!((p.fraction_complete - 0.6).abs() < 1e-9);
        assert_eq!(p.time_remaining, Duration::hours(18));
        assert_eq!(p.time_left_label(), "18 hours");
        assert_eq!(p.status, RequestStatus::Pending);
    }

    #[test]
    fn test_progress_fraction_can_exceed_one() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin", "frank", "grace"],
            VoteChoice::For,
        );
        let p = progress(&request, &config, t0());
        assert!((p.fraction_complete - 1.2).abs() < 1e-9);
        assert_eq!(p.display_fraction(), 1.0);
    }

    #[test]
    fn test_progress_after_window() {
        let config = PolicyConfig::default();
        let p = progress(&make_request(), &config, t0() + Duration::days(3));
        assert_eq!(p.time_remaining, Duration::zero());
        assert_eq!(p.time_left_label(), "closed");
    }

    #[test]
    fn test_progress_on_approved_request_has_no_time_left() {
        let config = PolicyConfig::default();
        let request = vote_all(
            make_request(),
            &["alice", "bob", "dave", "erin", "frank"],
            VoteChoice::For,
        );
        let approved = resolve(&request, &config, t0() + Duration::hours(1));
        assert_eq!(approved.status, RequestStatus::Approved);

        // Still inside the 24h window, but the request is final.
        let p = progress(&approved, &config, t0() + Duration::hours(2));
        assert_eq!(p.time_remaining, Duration::zero());
        assert_eq!(p.time_left_label(), "closed");
        assert_eq!(p.status, RequestStatus::Approved);
    }

    #[test]
    fn test_two_thirds_quorum_of_three_needs_two() {
        let config = PolicyConfig::from_fractions(0.1, 0.2, 0.6666, 3_600).unwrap();
        assert_eq!(required_votes(3, config.quorum_ratio()), 2);
    }

    #[test]
    fn test_resolve_with_longest_window_does_not_overflow() {
        let config =
            PolicyConfig::from_fractions(0.1, 0.2, 0.6, bitpool_core::MAX_VOTING_WINDOW_SECS)
                .unwrap();
        let request = make_request();
        assert_eq!(resolve(&request, &config, t0()).status, RequestStatus::Pending);
        let p = progress(&request, &config, t0());
        assert_eq!(p.time_left_label(), "365 days");
    }

    #[test]
    fn test_time_left_labels() {
        let mut p = progress(&make_request(), &PolicyConfig::default(), t0());
        p.time_remaining = Duration::hours(72);
        assert_eq!(p.time_left_label(), "3 days");
        p.time_remaining = Duration::minutes(90);
        assert_eq!(p.time_left_label(), "1 hour");
        p.time_remaining = Duration::minutes(42);
        assert_eq!(p.time_left_label(), "42 minutes");
        p.time_remaining = Duration::seconds(30);
        assert_eq!(p.time_left_label(), "less than a minute");
    }
}
