//! User Storage
//! Mission: Persist user accounts securely with SQLite

use crate::auth::{models::User, password};
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::sync::Arc;
use tracing::{info, warn};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
"#;

/// Credential store errors surfaced to callers as typed conditions.
#[derive(Debug)]
pub enum UserStoreError {
    /// Username or email already registered.
    Conflict,
    /// Uniform authentication failure - unknown username and wrong
    /// password are indistinguishable on purpose.
    InvalidCredentials,
    Hash(bcrypt::BcryptError),
    Database(rusqlite::Error),
}

impl std::fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStoreError::Conflict => write!(f, "Username or email already registered"),
            UserStoreError::InvalidCredentials => write!(f, "Invalid username or password"),
            UserStoreError::Hash(e) => write!(f, "Password hashing failed: {}", e),
            UserStoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for UserStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UserStoreError::Hash(e) => Some(e),
            UserStoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for UserStoreError {
    fn from(e: rusqlite::Error) -> Self {
        UserStoreError::Database(e)
    }
}

/// User storage with SQLite backend
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the user database and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize users schema")?;

        info!("👤 User store initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Register a new user with a hashed secret. The admin flag always
    /// defaults to false; privileged accounts come from `ensure_admin`.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let password_hash = password::hash(password).map_err(UserStoreError::Hash)?;
        let created_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();

        // Single case-sensitive existence check across both unique fields,
        // evaluated before the insert.
        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
            params![username, email],
            |row| row.get(0),
        )?;
        if taken > 0 {
            warn!("Registration rejected, username or email taken: {}", username);
            return Err(UserStoreError::Conflict);
        }

        conn.execute(
            "INSERT INTO users (username, email, password_hash, is_admin, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![username, email, password_hash, created_at],
        )?;
        let id = conn.last_insert_rowid();

        info!("✅ Registered user: {} ({})", username, id);

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            is_admin: false,
            created_at,
        })
    }

    /// Get user by username (exact, case-sensitive match).
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, email, password_hash, is_admin, created_at
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by id.
    pub fn find_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                "SELECT id, username, email, password_hash, is_admin, created_at
                 FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Verify username and password, returning the user on success.
    ///
    /// An unknown username and a failed password check both surface the
    /// same `InvalidCredentials` error so registered usernames cannot be
    /// probed through this path.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, UserStoreError> {
        let user = match self.find_by_username(username)? {
            Some(user) => user,
            None => {
                warn!("❌ Failed login attempt: {}", username);
                return Err(UserStoreError::InvalidCredentials);
            }
        };

        if !password::verify(password, &user.password_hash) {
            warn!("❌ Failed login attempt: {}", username);
            return Err(UserStoreError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Create an administrator account if the username is not taken yet.
    /// Safe to call on every startup.
    pub fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), UserStoreError> {
        let password_hash = password::hash(password).map_err(UserStoreError::Hash)?;
        let conn = self.conn.lock();

        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
            params![username, email],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Ok(());
        }

        conn.execute(
            "INSERT INTO users (username, email, password_hash, is_admin, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![username, email, password_hash, Utc::now().to_rfc3339()],
        )?;

        info!("🔐 Admin user created: {}", username);
        Ok(())
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_admin: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
    })
}
