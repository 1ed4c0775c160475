//! User Storage
//! Mission: Persist user accounts in the relational credential store (SQLite)

use crate::auth::models::User;
use crate::db::{self, StoreError};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
) WITHOUT ROWID;
"#;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

/// User storage with SQLite backend
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the credential store at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(db::open(db_path)?)),
        };
        store.init_db()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(db::open_in_memory()?)),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Insert a new user. `password_hash` must already be hashed.
    ///
    /// Fails with `StoreError::DuplicateKey` when the username or email is taken.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        self.conn.lock().execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        )?;

        info!("✅ Created user: {} ({})", user.username, user.id);

        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.get_user_where("username", username)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.get_user_where("email", email)
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.get_user_where("id", id)
    }

    fn get_user_where(&self, column: &'static str, value: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM users WHERE {} = ?1",
            USER_COLUMNS, column
        ))?;

        let user = stmt.query_row(params![value], row_to_user).optional()?;
        Ok(user)
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}
