//! User persistence: create with uniqueness enforcement, list, lookups.
//!
//! All functions are synchronous and take a borrowed connection — callers
//! hold the DbPool lock inside tokio::task::spawn_blocking.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::User;

/// Store-level failure taxonomy. Duplicates and misses are client faults;
/// everything else maps to a generic server error at the API boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email ID already exists")]
    DuplicateEmail,
    #[error("Login ID already exists")]
    DuplicateLoginId,
    /// A uniqueness constraint fired on insert but the violated field could
    /// not be determined (lost race between the pre-check and the insert).
    #[error("Email ID or Login ID already exists")]
    Duplicate,
    #[error("User not found")]
    NotFound,
    /// The connection mutex was poisoned — another DB task panicked.
    #[error("user store unavailable")]
    Unavailable,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

/// Registration fields as accepted by create_user. Address fields are
/// optional; absent ones are persisted as empty strings.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub mobile_no: String,
    pub email_id: String,
    pub login_id: String,
    pub password: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Safe projection: every column except the password hash.
const USER_COLUMNS: &str =
    "id, first_name, last_name, mobile_no, email_id, login_id, \
     street, city, state, country, created_at, updated_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        mobile_no: row.get(3)?,
        email_id: row.get(4)?,
        login_id: row.get(5)?,
        street: row.get(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
        country: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a new user. The email/login pre-checks let the API name the
/// violated constraint; the UNIQUE constraints in the schema remain the
/// backstop for concurrent registrations, reported as a generic duplicate.
pub fn create_user(conn: &Connection, new_user: NewUser) -> Result<User, StoreError> {
    let email_taken: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE email_id = ?1",
            [&new_user.email_id],
            |row| row.get(0),
        )
        .ok();
    if email_taken.is_some() {
        return Err(StoreError::DuplicateEmail);
    }

    let login_taken: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE login_id = ?1",
            [&new_user.login_id],
            |row| row.get(0),
        )
        .ok();
    if login_taken.is_some() {
        return Err(StoreError::DuplicateLoginId);
    }

    let id = Uuid::now_v7().to_string();
    let now = Utc::now().to_rfc3339();
    let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)?;

    let inserted = conn.execute(
        "INSERT INTO users (id, first_name, last_name, mobile_no, email_id, login_id, \
         password_hash, street, city, state, country, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            id,
            new_user.first_name,
            new_user.last_name,
            new_user.mobile_no,
            new_user.email_id,
            new_user.login_id,
            password_hash,
            new_user.street.unwrap_or_default(),
            new_user.city.unwrap_or_default(),
            new_user.state.unwrap_or_default(),
            new_user.country.unwrap_or_default(),
            now,
            now,
        ],
    );

    match inserted {
        Ok(_) => find_user_by_id(conn, &id),
        Err(rusqlite::Error::SqliteFailure(err, msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            tracing::debug!(error = ?msg, "uniqueness constraint hit on insert");
            Err(StoreError::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}

/// All users, newest first, password hash excluded.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
    ))?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// One user by email, password hash excluded.
pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<User, StoreError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email_id = ?1"),
        [email],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => other.into(),
    })
}

/// One user by id, password hash excluded. Used to resolve joinRoom events
/// that carry a bare user id instead of email + display name.
pub fn find_user_by_id(conn: &Connection, id: &str) -> Result<User, StoreError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => other.into(),
    })
}
