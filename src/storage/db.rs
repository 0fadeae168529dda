use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, Result};

/// A registered user of the bot.
///
/// One row per Telegram chat identity. The history columns are persisted as
/// JSON arrays of whole-taka amounts; both are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Telegram chat id, primary key
    pub user_id: i64,
    /// Telegram username, if available
    pub username: Option<String>,
    /// Chat id of the user who referred this one; set once at creation,
    /// never reassigned. May dangle after the referrer is removed.
    pub referrer_id: Option<i64>,
    /// Whether the admin has approved the activation payment
    pub activated: bool,
    /// Current balance in whole taka, never negative
    pub balance: i64,
    /// Amounts of all withdraw requests, oldest first
    pub withdraw_history: Vec<i64>,
    /// Amounts of all recharge requests, oldest first
    pub recharge_history: Vec<i64>,
}

impl User {
    /// Returns the Telegram chat id of the user.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns whether the account has been activated by the admin.
    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and bootstraps
/// the schema on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Returns
///
/// Returns a `DbPool` on success or an `r2d2::Error` if pool creation fails.
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Ensure schema is up to date on first connection
    let conn = pool.get()?;
    if let Err(e) = migrate_schema(&conn) {
        log::warn!("Failed to migrate schema: {}", e);
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Bootstrap the database schema
fn migrate_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            username TEXT,
            referrer_id INTEGER,
            activated INTEGER NOT NULL DEFAULT 0,
            balance INTEGER NOT NULL DEFAULT 0,
            withdraw_history TEXT NOT NULL DEFAULT '[]',
            recharge_history TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_referrer_id ON users(referrer_id)",
        [],
    )?;

    Ok(())
}

/// Decode a history column, tolerating backend quirks.
///
/// A malformed value is logged and read as an empty history rather than
/// failing the whole row.
fn decode_history(raw: &str, user_id: i64, column: &str) -> Vec<i64> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("Malformed {} for user {}: {} (raw: {})", column, user_id, e, raw);
        Vec::new()
    })
}

fn encode_history(history: &[i64]) -> String {
    serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string())
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User> {
    let user_id: i64 = row.get(0)?;
    let withdraw_raw: String = row.get(5)?;
    let recharge_raw: String = row.get(6)?;

    Ok(User {
        user_id,
        username: row.get(1)?,
        referrer_id: row.get(2)?,
        activated: row.get::<_, i64>(3)? != 0,
        balance: row.get(4)?,
        withdraw_history: decode_history(&withdraw_raw, user_id, "withdraw_history"),
        recharge_history: decode_history(&recharge_raw, user_id, "recharge_history"),
    })
}

const USER_COLUMNS: &str = "user_id, username, referrer_id, activated, balance, withdraw_history, recharge_history";

/// Creates a new user row with the registration defaults.
///
/// # Errors
///
/// Returns an error if a user with this id already exists or the insert
/// fails; idempotent registration is handled one level up.
pub fn create_user(conn: &Connection, user_id: i64, username: Option<String>, referrer_id: Option<i64>) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, username, referrer_id, activated, balance, withdraw_history, recharge_history)
         VALUES (?1, ?2, ?3, 0, 0, '[]', '[]')",
        rusqlite::params![user_id, username, referrer_id],
    )?;
    Ok(())
}

/// Fetches a user by Telegram chat id.
///
/// Returns `Ok(None)` when the user has never registered (or was removed).
pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
        rusqlite::params![user_id],
        row_to_user,
    )
    .optional()
}

/// Fetches the whole registry, oldest registrations first.
pub fn get_all_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY user_id", USER_COLUMNS))?;
    let rows = stmt.query_map([], row_to_user)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

/// Marks a user as activated. One-way; there is no deactivation path.
pub fn set_activated(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET activated = 1 WHERE user_id = ?1",
        rusqlite::params![user_id],
    )?;
    Ok(())
}

/// Credits `amount` to a user's balance.
pub fn add_to_balance(conn: &Connection, user_id: i64, amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET balance = balance + ?1 WHERE user_id = ?2",
        rusqlite::params![amount, user_id],
    )?;
    Ok(())
}

/// Writes the balance and withdraw history after a validated withdraw.
pub fn update_withdraw(conn: &Connection, user_id: i64, new_balance: i64, withdraw_history: &[i64]) -> Result<()> {
    conn.execute(
        "UPDATE users SET balance = ?1, withdraw_history = ?2 WHERE user_id = ?3",
        rusqlite::params![new_balance, encode_history(withdraw_history), user_id],
    )?;
    Ok(())
}

/// Writes the recharge history after a validated recharge request.
///
/// Balance is deliberately untouched; recharge credit happens out of band
/// after manual admin verification.
pub fn update_recharge(conn: &Connection, user_id: i64, recharge_history: &[i64]) -> Result<()> {
    conn.execute(
        "UPDATE users SET recharge_history = ?1 WHERE user_id = ?2",
        rusqlite::params![encode_history(recharge_history), user_id],
    )?;
    Ok(())
}

/// Deletes a user row entirely. Returns the number of rows removed.
///
/// Referrer references in other rows are not cleaned up.
pub fn delete_user(conn: &Connection, user_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![user_id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_pool() -> (NamedTempFile, DbPool) {
        let file = NamedTempFile::new().expect("temp db file");
        let pool = create_pool(file.path().to_str().expect("utf-8 path")).expect("pool");
        (file, pool)
    }

    #[test]
    fn create_and_get_round_trip() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 100, Some("alice".to_string()), None).unwrap();

        let user = get_user(&conn, 100).unwrap().expect("user exists");
        assert_eq!(user.user_id, 100);
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.referrer_id, None);
        assert!(!user.activated);
        assert_eq!(user.balance, 0);
        assert!(user.withdraw_history.is_empty());
        assert!(user.recharge_history.is_empty());
    }

    #[test]
    fn get_unknown_user_is_none() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        assert_eq!(get_user(&conn, 42).unwrap(), None);
    }

    #[test]
    fn duplicate_create_fails() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 100, None, None).unwrap();
        assert!(create_user(&conn, 100, None, None).is_err());
    }

    #[test]
    fn history_columns_round_trip_as_json() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 100, None, None).unwrap();
        update_withdraw(&conn, 100, 30, &[50, 20]).unwrap();
        update_recharge(&conn, 100, &[25]).unwrap();

        let user = get_user(&conn, 100).unwrap().unwrap();
        assert_eq!(user.balance, 30);
        assert_eq!(user.withdraw_history, vec![50, 20]);
        assert_eq!(user.recharge_history, vec![25]);
    }

    #[test]
    fn malformed_history_reads_as_empty() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 100, None, None).unwrap();
        conn.execute("UPDATE users SET withdraw_history = 'oops' WHERE user_id = 100", [])
            .unwrap();

        let user = get_user(&conn, 100).unwrap().unwrap();
        assert!(user.withdraw_history.is_empty());
    }

    #[test]
    fn delete_removes_row() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 100, None, None).unwrap();
        assert_eq!(delete_user(&conn, 100).unwrap(), 1);
        assert_eq!(get_user(&conn, 100).unwrap(), None);
        assert_eq!(delete_user(&conn, 100).unwrap(), 0);
    }

    #[test]
    fn get_all_users_orders_by_id() {
        let (_file, pool) = test_pool();
        let conn = get_connection(&pool).unwrap();

        create_user(&conn, 300, None, None).unwrap();
        create_user(&conn, 100, None, None).unwrap();
        create_user(&conn, 200, None, Some(100)).unwrap();

        let users = get_all_users(&conn).unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![100, 200, 300]);
        assert_eq!(users[1].referrer_id, Some(100));
    }
}
