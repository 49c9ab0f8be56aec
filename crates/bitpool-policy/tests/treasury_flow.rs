// crates/bitpool-policy/tests/treasury_flow.rs
//
// End-to-end tests for the treasury policy engine.
//
// Drives a family savings group through deposits, instant withdrawals and
// vote-gated withdrawals using only the public API, with the test acting as
// the ledger that owns balances and requests.

use chrono::{DateTime, Duration, Utc};

use bitpool_core::{
    Balance, BitPoolError, MemberId, MemberRoster, PolicyConfig, RequestStatus, Sats, VoteChoice,
};
use bitpool_policy::{
    deposit_activity, instant_withdrawal_activity, request_activity, ActivityKind,
    ActivityStatus, GateDecision, PolicyEngine, RejectionReason,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn btc(s: &str) -> Sats {
    Sats::parse_btc(s).unwrap()
}

fn family() -> MemberRoster {
    [
        "Alice M.", "Bob K.", "Carol D.", "Dave R.", "Erin S.", "Frank T.", "Grace L.", "Heidi W.",
    ]
    .into_iter()
    .collect()
}

fn dashboard_balance() -> Balance {
    Balance::with_amounts(btc("0.625"), btc("0.125"))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_dashboard_scenario_instant_and_vote() {
    let engine = PolicyEngine::default();
    let balance = dashboard_balance();
    assert_eq!(balance.total(), btc("0.75"));

    assert_eq!(engine.instant_threshold(&balance), btc("0.125"));
    assert_eq!(
        engine.evaluate(btc("0.08"), &balance).unwrap(),
        GateDecision::Instant
    );
    assert_eq!(
        engine.evaluate(btc("0.2"), &balance).unwrap(),
        GateDecision::RequiresVote
    );
}

#[test]
fn test_deposits_accumulate_without_rounding_leakage() {
    let engine = PolicyEngine::default();
    let mut balance = Balance::new();
    let deposits = ["0.05", "0.00000015", "0.1234567", "0.00000001", "1"];

    let mut deposited = Sats::ZERO;
    for amount in deposits {
        let amount = btc(amount);
        let parts = engine.split(amount).unwrap();
        balance.apply_deposit(&parts).unwrap();
        deposited = deposited + amount;
    }

    assert_eq!(balance.total(), deposited);
}

#[test]
fn test_instant_withdrawal_flow() {
    let engine = PolicyEngine::default();
    let mut balance = dashboard_balance();
    let bob = MemberId::from("Bob K.");

    let decision = engine.evaluate(btc("0.1"), &balance).unwrap();
    assert!(decision.is_instant());
    balance.apply_withdrawal(btc("0.1")).unwrap();
    let entry = instant_withdrawal_activity(&bob, btc("0.1"), t0());

    assert_eq!(balance.available, btc("0.525"));
    assert_eq!(balance.vault, btc("0.125"));
    assert_eq!(entry.kind, ActivityKind::Withdrawal);
    assert_eq!(entry.status, ActivityStatus::Completed);
}

#[test]
fn test_vote_gated_withdrawal_approved_and_settled() {
    let engine = PolicyEngine::default();
    let roster = family();
    let balance = dashboard_balance();

    let mut request = engine
        .open_request(
            "Carol D.".into(),
            btc("0.2"),
            "Emergency medical expenses",
            &balance,
            &roster,
            t0(),
        )
        .unwrap();
    assert_eq!(
        request_activity(&request).map(|e| e.status),
        Some(ActivityStatus::Pending)
    );

    request = engine
        .vote_and_resolve(&request, &"Dave R.".into(), VoteChoice::Against, &roster, t0())
        .unwrap();
    for (hour, voter) in ["Alice M.", "Bob K.", "Erin S.", "Frank T."].iter().enumerate() {
        let now = t0() + Duration::hours(hour as i64 + 1);
        request = engine
            .vote_and_resolve(&request, &(*voter).into(), VoteChoice::For, &roster, now)
            .unwrap();
    }
    let p = engine.progress(&request, t0() + Duration::hours(6));
    assert_eq!(p.votes_for, 4);
    assert_eq!(p.votes_against, 1);
    assert_eq!(p.required_votes, 5);
    assert_eq!(p.time_left_label(), "18 hours");
    assert_eq!(request.status, RequestStatus::Pending);

    let approve_at = t0() + Duration::hours(7);
    request = engine
        .vote_and_resolve(&request, &"Grace L.".into(), VoteChoice::For, &roster, approve_at)
        .unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(request.resolved_at, Some(approve_at));

    let settled = engine.settle(&request, &balance).unwrap();
    assert_eq!(settled.available, btc("0.425"));
    assert_eq!(settled.vault, btc("0.125"));

    let entry = request_activity(&request).unwrap();
    assert_eq!(entry.status, ActivityStatus::Approved);
    assert_eq!(entry.timestamp, approve_at);

    // Late votes are refused once the request is final.
    let err = engine
        .cast_vote(&request, &"Heidi W.".into(), VoteChoice::Against, &roster, approve_at)
        .unwrap_err();
    assert!(matches!(err, BitPoolError::AlreadyFinalized(_)));
}

#[test]
fn test_vote_gated_withdrawal_rejected_early() {
    let engine = PolicyEngine::default();
    let roster = family();
    let mut request = engine
        .open_request("Carol D.".into(), btc("0.3"), "Holiday", &dashboard_balance(), &roster, t0())
        .unwrap();

    for voter in ["Alice M.", "Bob K.", "Dave R.", "Erin S."] {
        request = engine
            .vote_and_resolve(&request, &voter.into(), VoteChoice::Against, &roster, t0())
            .unwrap();
    }

    assert_eq!(request.status, RequestStatus::Rejected);
    assert!(request_activity(&request).is_none());
    assert!(matches!(
        engine.settle(&request, &dashboard_balance()),
        Err(BitPoolError::NotApproved { .. })
    ));
}

#[test]
fn test_vote_gated_withdrawal_expires_on_tick() {
    let engine = PolicyEngine::default();
    let roster = family();
    let mut request = engine
        .open_request("Carol D.".into(), btc("0.3"), "Laptop", &dashboard_balance(), &roster, t0())
        .unwrap();
    request = engine
        .vote_and_resolve(&request, &"Alice M.".into(), VoteChoice::For, &roster, t0())
        .unwrap();

    let tick = t0() + engine.config().voting_window();
    let expired = engine.resolve(&request, tick);
    assert_eq!(expired.status, RequestStatus::Expired);
    assert_eq!(engine.resolve(&expired, tick + Duration::hours(1)), expired);
}

#[test]
fn test_request_uses_membership_snapshot() {
    let engine = PolicyEngine::default();
    let mut roster = family();
    let request = engine
        .open_request("Carol D.".into(), btc("0.3"), "Tuition", &dashboard_balance(), &roster, t0())
        .unwrap();

    // A member leaves after the request opened: the quorum base stays at 8,
    // and the departed member can no longer vote.
    roster.remove(&"Heidi W.".into());
    assert_eq!(request.total_members, 8);
    let err = engine
        .cast_vote(&request, &"Heidi W.".into(), VoteChoice::For, &roster, t0())
        .unwrap_err();
    assert!(matches!(err, BitPoolError::UnknownMember(_)));
}

#[test]
fn test_deposit_activity_matches_split() {
    let engine = PolicyEngine::default();
    let parts = engine.split(btc("0.05")).unwrap();
    let entries = deposit_activity(&"Alice M.".into(), &parts, t0());
    let vault_entry = entries
        .iter()
        .find(|e| e.kind == ActivityKind::VaultDeposit)
        .unwrap();
    assert_eq!(vault_entry.amount, parts.vault);
    assert_eq!(vault_entry.amount, btc("0.005"));
}

#[test]
fn test_custom_policy_thresholds() {
    let config = PolicyConfig::from_fractions(0.25, 0.5, 1.0, 3_600).unwrap();
    let engine = PolicyEngine::new(config);
    let parts = engine.split(btc("1")).unwrap();
    assert_eq!(parts.vault, btc("0.25"));
    assert_eq!(parts.available, btc("0.75"));

    let balance = Balance::with_amounts(btc("1"), Sats::ZERO);
    assert_eq!(
        engine.evaluate(btc("0.5"), &balance).unwrap(),
        GateDecision::Instant
    );
    assert_eq!(
        engine.evaluate(btc("1.5"), &balance).unwrap(),
        GateDecision::Rejected(RejectionReason::InsufficientFunds)
    );
}
