//! User state transitions and balance bookkeeping.
//!
//! Every operation here is the whole story of a user's lifecycle:
//! `register` → admin `activate` (with a one-time referral payout) →
//! self-service `withdraw`/`recharge` requests → admin `remove`.
//!
//! Each mutate path runs inside a single SQLite transaction: read,
//! validate, write, commit. Validation failures return a typed outcome and
//! leave the registry untouched. Notifications are never sent from here;
//! callers dispatch them after the commit.

use rusqlite::Connection;

use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::db::{self, DbPool, User};

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A fresh row was created with the registration defaults
    Created,
    /// The id was already registered; no fields were touched
    AlreadyRegistered,
}

/// A referral credit issued during activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralPayout {
    pub referrer_id: i64,
    pub amount: i64,
}

/// Result of an admin activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// The user was flipped inactive → active; `payout` carries the
    /// referral credit if one was issued
    Activated { payout: Option<ReferralPayout> },
    /// The user was already active; nothing changed and no payout fired
    AlreadyActive,
    NotFound,
}

/// Result of a withdraw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Accepted { new_balance: i64 },
    BelowMinimum { minimum: i64 },
    InsufficientBalance { balance: i64 },
    NotActivated,
    NotFound,
}

/// Result of a recharge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RechargeOutcome {
    Accepted,
    BelowMinimum { minimum: i64 },
    NotActivated,
    NotFound,
}

/// Result of an admin removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Registers a user on first contact.
///
/// Idempotent: re-registering an existing id never resets `activated`,
/// `balance`, histories, or the referrer.
pub fn register(
    pool: &DbPool,
    user_id: i64,
    username: Option<String>,
    referrer_id: Option<i64>,
) -> AppResult<RegisterOutcome> {
    let mut conn = db::get_connection(pool)?;
    let tx = conn.transaction()?;

    if db::get_user(&tx, user_id)?.is_some() {
        return Ok(RegisterOutcome::AlreadyRegistered);
    }

    db::create_user(&tx, user_id, username, referrer_id)?;
    tx.commit()?;

    log::info!("Registered user {} (referrer: {:?})", user_id, referrer_id);
    Ok(RegisterOutcome::Created)
}

/// Activates a user, crediting the referrer once.
///
/// The referral payout fires only on the inactive → active transition, so
/// a repeated `/approve` cannot double-credit the referrer. A dangling or
/// missing referrer means no payout.
pub fn activate(pool: &DbPool, user_id: i64) -> AppResult<ActivateOutcome> {
    let mut conn = db::get_connection(pool)?;
    let tx = conn.transaction()?;

    let user = match db::get_user(&tx, user_id)? {
        Some(user) => user,
        None => return Ok(ActivateOutcome::NotFound),
    };
    if user.activated {
        return Ok(ActivateOutcome::AlreadyActive);
    }

    db::set_activated(&tx, user_id)?;
    let payout = credit_referrer(&tx, &user)?;
    tx.commit()?;

    log::info!("Activated user {} (payout: {:?})", user_id, payout);
    Ok(ActivateOutcome::Activated { payout })
}

fn credit_referrer(conn: &Connection, user: &User) -> AppResult<Option<ReferralPayout>> {
    let Some(referrer_id) = user.referrer_id else {
        return Ok(None);
    };

    if db::get_user(conn, referrer_id)?.is_none() {
        log::warn!(
            "User {} has dangling referrer {}; skipping payout",
            user.user_id,
            referrer_id
        );
        return Ok(None);
    }

    let amount = *config::fees::REFERRAL_REWARD;
    db::add_to_balance(conn, referrer_id, amount)?;
    Ok(Some(ReferralPayout { referrer_id, amount }))
}

/// Files a withdraw request, debiting the balance.
///
/// This only records the request and alerts are sent by the caller;
/// fulfillment is manual and external.
pub fn withdraw(pool: &DbPool, user_id: i64, amount: i64) -> AppResult<WithdrawOutcome> {
    let mut conn = db::get_connection(pool)?;
    let tx = conn.transaction()?;

    let user = match db::get_user(&tx, user_id)? {
        Some(user) => user,
        None => return Ok(WithdrawOutcome::NotFound),
    };
    if !user.activated {
        return Ok(WithdrawOutcome::NotActivated);
    }

    let minimum = *config::fees::MIN_WITHDRAW_AMOUNT;
    if amount <= 0 || amount < minimum {
        return Ok(WithdrawOutcome::BelowMinimum { minimum });
    }
    if amount > user.balance {
        return Ok(WithdrawOutcome::InsufficientBalance { balance: user.balance });
    }

    let new_balance = user.balance - amount;
    let mut history = user.withdraw_history;
    history.push(amount);
    db::update_withdraw(&tx, user_id, new_balance, &history)?;
    tx.commit()?;

    log::info!("Withdraw request: user {}, amount {}, balance {}", user_id, amount, new_balance);
    Ok(WithdrawOutcome::Accepted { new_balance })
}

/// Files a recharge request.
///
/// Balance is untouched: the amount is only recorded and forwarded to the
/// admin, who credits it out of band after verifying the screenshot.
pub fn recharge(pool: &DbPool, user_id: i64, amount: i64) -> AppResult<RechargeOutcome> {
    let mut conn = db::get_connection(pool)?;
    let tx = conn.transaction()?;

    let user = match db::get_user(&tx, user_id)? {
        Some(user) => user,
        None => return Ok(RechargeOutcome::NotFound),
    };
    if !user.activated {
        return Ok(RechargeOutcome::NotActivated);
    }

    let minimum = *config::fees::MIN_RECHARGE_AMOUNT;
    if amount <= 0 || amount < minimum {
        return Ok(RechargeOutcome::BelowMinimum { minimum });
    }

    let mut history = user.recharge_history;
    history.push(amount);
    db::update_recharge(&tx, user_id, &history)?;
    tx.commit()?;

    log::info!("Recharge request: user {}, amount {}", user_id, amount);
    Ok(RechargeOutcome::Accepted)
}

/// Removes a user record entirely.
///
/// No archival and no cascade; `referrer_id` values pointing at the
/// removed user stay behind and are tolerated at payout time.
pub fn remove(pool: &DbPool, user_id: i64) -> AppResult<RemoveOutcome> {
    let conn = db::get_connection(pool)?;
    let removed = db::delete_user(&conn, user_id)?;

    if removed > 0 {
        log::info!("Removed user {}", user_id);
        Ok(RemoveOutcome::Removed)
    } else {
        Ok(RemoveOutcome::NotFound)
    }
}

/// Answers the activation-status query.
///
/// Store errors degrade to `false` ("user not found"), matching the
/// graceful-degradation contract of the registry.
pub fn is_activated(pool: &DbPool, user_id: i64) -> bool {
    let conn = match db::get_connection(pool) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get DB connection for activation check: {}", e);
            return false;
        }
    };

    match db::get_user(&conn, user_id) {
        Ok(Some(user)) => user.activated,
        Ok(None) => false,
        Err(e) => {
            log::error!("Failed to check activation for user {}: {}", user_id, e);
            false
        }
    }
}
