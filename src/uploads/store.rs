//! Upload Storage
//! Mission: Keep upload metadata as JSON documents keyed by owner
//!
//! Only `id`, `user_id` and `created_at` are lifted into columns; the full
//! document lives in `body_json` so new fields need no migration.

use crate::db::{self, StoreError};
use crate::uploads::models::Upload;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS uploads (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    body_json TEXT NOT NULL
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_uploads_user
    ON uploads(user_id, created_at DESC);
"#;

/// Document store for upload metadata
pub struct UploadStore {
    conn: Arc<Mutex<Connection>>,
}

impl UploadStore {
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

    pub fn insert(&self, upload: &Upload) -> Result<(), StoreError> {
        // Serialize outside the lock
        let body_json = serde_json::to_string(upload)?;

        self.conn.lock().execute(
            "INSERT INTO uploads (id, user_id, created_at, body_json) VALUES (?1, ?2, ?3, ?4)",
            params![upload.id, upload.user_id, upload.created_at, body_json],
        )?;

        info!("📼 Stored upload {} for user {}", upload.id, upload.user_id);
        Ok(())
    }

    /// All uploads owned by `user_id`, newest first
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Upload>, StoreError> {
        let bodies = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare_cached(
                "SELECT body_json FROM uploads WHERE user_id = ?1
                 ORDER BY created_at DESC, id",
            )?;
            let rows = stmt
                .query_map(params![user_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let uploads = bodies
            .iter()
            .map(|body| serde_json::from_str::<Upload>(body))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} uploads for user {}", uploads.len(), user_id);
        Ok(uploads)
    }

    /// Delete an upload if `user_id` owns it. Returns whether a document was removed.
    pub fn delete_for_user(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let rows_affected = self.conn.lock().execute(
            "DELETE FROM uploads WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;

        if rows_affected > 0 {
            info!("🗑️  Deleted upload {} for user {}", id, user_id);
        }
        Ok(rows_affected > 0)
    }
}
