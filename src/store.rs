//! De-duplication store — processed message ids on libSQL.
//!
//! Append-only within a run: ids are recorded after a successful
//! mutation and never removed.

use std::path::Path;
use std::sync::Arc;

use libsql::{Connection, Database, params};
use tracing::info;

use crate::error::StoreError;

/// Persisted set of message ids already acted upon.
pub struct SeenStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl SeenStore {
    /// Open (or create) the store at the given path.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("failed to create cache dir: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;
        let store = Self::from_db(db).await?;
        info!(path = %path.display(), "Seen store opened");
        Ok(store)
    }

    /// In-memory store, for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;
        Self::from_db(db).await
    }

    async fn from_db(db: Database) -> Result<Self, StoreError> {
        let conn = db.connect().map_err(|e| StoreError::Open(e.to_string()))?;
        conn.execute("CREATE TABLE IF NOT EXISTS seen (id TEXT PRIMARY KEY)", ())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Whether this message id has already been processed.
    pub async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM seen WHERE id = ?1", params![id])
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(row.is_some())
    }

    /// Record a processed message id. Idempotent.
    pub async fn record(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("INSERT OR IGNORE INTO seen (id) VALUES (?1)", params![id])
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Number of recorded ids.
    pub async fn len(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM seen", ())
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
            .ok_or_else(|| StoreError::Query("COUNT returned no rows".into()))?;
        let count: i64 = row.get(0).map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_then_contains() {
        let store = SeenStore::in_memory().await.unwrap();
        assert!(!store.contains("m1").await.unwrap());

        store.record("m1").await.unwrap();
        assert!(store.contains("m1").await.unwrap());
        assert!(!store.contains("m2").await.unwrap());
    }

    #[tokio::test]
    async fn record_is_idempotent() {
        let store = SeenStore::in_memory().await.unwrap();
        store.record("m1").await.unwrap();
        store.record("m1").await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.db");

        {
            let store = SeenStore::open(&path).await.unwrap();
            store.record("m1").await.unwrap();
        }

        let store = SeenStore::open(&path).await.unwrap();
        assert!(store.contains("m1").await.unwrap());
    }
}
