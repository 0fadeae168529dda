//! Integration tests for the ledger state machine
//!
//! Run with: cargo test --test ledger_integration_test
//!
//! These walk the full user lifecycle the way the bot drives it:
//! register → activate → withdraw/recharge → remove.

mod common;

use common::TestDb;
use takabot::ledger::{self, ActivateOutcome, RechargeOutcome, RemoveOutcome, WithdrawOutcome};
use takabot::storage::db;

fn get_user(test_db: &TestDb, user_id: i64) -> Option<db::User> {
    let conn = db::get_connection(&test_db.pool).unwrap();
    db::get_user(&conn, user_id).unwrap()
}

fn credit(test_db: &TestDb, user_id: i64, amount: i64) {
    let conn = db::get_connection(&test_db.pool).unwrap();
    db::add_to_balance(&conn, user_id, amount).unwrap();
}

// ============================================================================
// Registration & activation
// ============================================================================

#[test]
fn lone_user_activation_pays_nobody() {
    let test_db = TestDb::new();

    // User A registers with no referrer, balance 0, inactive
    ledger::register(&test_db.pool, 1001, Some("a".to_string()), None).unwrap();
    let user = get_user(&test_db, 1001).unwrap();
    assert!(!user.activated);
    assert_eq!(user.balance, 0);

    // Admin activates A: no referrer to pay, balance stays 0
    let outcome = ledger::activate(&test_db.pool, 1001).unwrap();
    assert_eq!(outcome, ActivateOutcome::Activated { payout: None });
    assert_eq!(get_user(&test_db, 1001).unwrap().balance, 0);
}

#[test]
fn referred_activation_credits_the_referrer_exactly_once() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, Some("a".to_string()), None).unwrap();
    ledger::register(&test_db.pool, 1002, Some("b".to_string()), Some(1001)).unwrap();

    let outcome = ledger::activate(&test_db.pool, 1002).unwrap();
    let payout = match outcome {
        ActivateOutcome::Activated { payout: Some(payout) } => payout,
        other => panic!("expected a payout, got {:?}", other),
    };
    assert_eq!(payout.referrer_id, 1001);
    assert_eq!(get_user(&test_db, 1001).unwrap().balance, payout.amount);

    // A second /approve must not double-credit
    assert_eq!(ledger::activate(&test_db.pool, 1002).unwrap(), ActivateOutcome::AlreadyActive);
    assert_eq!(get_user(&test_db, 1001).unwrap().balance, payout.amount);
}

#[test]
fn re_registration_preserves_everything() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::register(&test_db.pool, 1002, Some("b".to_string()), Some(1001)).unwrap();
    ledger::activate(&test_db.pool, 1002).unwrap();
    credit(&test_db, 1002, 100);

    // Re-sending /start (with a different referrer, even) is a field no-op
    ledger::register(&test_db.pool, 1002, Some("other".to_string()), Some(9999)).unwrap();

    let user = get_user(&test_db, 1002).unwrap();
    assert_eq!(user.username.as_deref(), Some("b"));
    assert_eq!(user.referrer_id, Some(1001));
    assert!(user.activated);
    assert_eq!(user.balance, 100);
}

// ============================================================================
// Withdraw requests
// ============================================================================

#[test]
fn withdraw_at_threshold_debits_and_logs() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::activate(&test_db.pool, 1001).unwrap();
    credit(&test_db, 1001, 100);

    let outcome = ledger::withdraw(&test_db.pool, 1001, 50).unwrap();
    assert_eq!(outcome, WithdrawOutcome::Accepted { new_balance: 50 });

    let user = get_user(&test_db, 1001).unwrap();
    assert_eq!(user.balance, 50);
    assert_eq!(user.withdraw_history, vec![50]);
}

#[test]
fn withdraw_over_balance_is_rejected_without_mutation() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::activate(&test_db.pool, 1001).unwrap();
    credit(&test_db, 1001, 10);

    let outcome = ledger::withdraw(&test_db.pool, 1001, 50).unwrap();
    assert_eq!(outcome, WithdrawOutcome::InsufficientBalance { balance: 10 });

    let user = get_user(&test_db, 1001).unwrap();
    assert_eq!(user.balance, 10);
    assert!(user.withdraw_history.is_empty());
}

#[test]
fn repeated_withdrawals_append_in_order() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::activate(&test_db.pool, 1001).unwrap();
    credit(&test_db, 1001, 200);

    ledger::withdraw(&test_db.pool, 1001, 50).unwrap();
    ledger::withdraw(&test_db.pool, 1001, 70).unwrap();

    let user = get_user(&test_db, 1001).unwrap();
    assert_eq!(user.balance, 80);
    assert_eq!(user.withdraw_history, vec![50, 70]);
}

// ============================================================================
// Recharge requests
// ============================================================================

#[test]
fn inactive_recharge_is_rejected() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();

    let outcome = ledger::recharge(&test_db.pool, 1001, 25).unwrap();
    assert_eq!(outcome, RechargeOutcome::NotActivated);
    assert!(get_user(&test_db, 1001).unwrap().recharge_history.is_empty());
}

#[test]
fn recharge_is_advisory_bookkeeping_only() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::activate(&test_db.pool, 1001).unwrap();

    ledger::recharge(&test_db.pool, 1001, 25).unwrap();
    ledger::recharge(&test_db.pool, 1001, 40).unwrap();

    let user = get_user(&test_db, 1001).unwrap();
    assert_eq!(user.recharge_history, vec![25, 40]);
    // Balance is only credited out of band, never here
    assert_eq!(user.balance, 0);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn removed_user_is_indistinguishable_from_unregistered() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::activate(&test_db.pool, 1001).unwrap();

    assert_eq!(ledger::remove(&test_db.pool, 1001).unwrap(), RemoveOutcome::Removed);
    assert_eq!(get_user(&test_db, 1001), None);
    assert!(!ledger::is_activated(&test_db.pool, 1001));
    assert_eq!(ledger::remove(&test_db.pool, 1001).unwrap(), RemoveOutcome::NotFound);
}

#[test]
fn removing_a_referrer_leaves_a_tolerated_dangling_reference() {
    let test_db = TestDb::new();

    ledger::register(&test_db.pool, 1001, None, None).unwrap();
    ledger::register(&test_db.pool, 1002, None, Some(1001)).unwrap();
    ledger::remove(&test_db.pool, 1001).unwrap();

    // The referrer reference stays behind; activation simply pays nobody
    assert_eq!(get_user(&test_db, 1002).unwrap().referrer_id, Some(1001));
    let outcome = ledger::activate(&test_db.pool, 1002).unwrap();
    assert_eq!(outcome, ActivateOutcome::Activated { payout: None });
}
