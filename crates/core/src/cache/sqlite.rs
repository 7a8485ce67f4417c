//! SQLite-backed session store.
//!
//! Items are scoped by a session id, so several sessions can share one
//! database file without seeing each other's data. Reopening the file with the
//! same session id restores that session's items. Statements run on the
//! tokio-rusqlite background thread.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::migrations;
use super::store::SessionStore;
use crate::Error;

/// Session store handle over a single SQLite connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Connection,
    session_id: String,
}

impl SqliteStore {
    /// Open (or create) a database at the given path for `session_id`.
    ///
    /// Applies pragmas and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>, session_id: impl Into<String>) -> Result<Self, Error> {
        let session_id = checked_session_id(session_id.into())?;
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, session_id).await
    }

    /// Open an in-memory database, mostly useful for tests.
    pub async fn open_in_memory(session_id: impl Into<String>) -> Result<Self, Error> {
        let session_id = checked_session_id(session_id.into())?;
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, session_id).await
    }

    async fn init(conn: Connection, session_id: String) -> Result<Self, Error> {
        conn.call(|conn| -> Result<(), Error> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Delete the items of every other session.
    ///
    /// Returns the number of deleted rows.
    pub async fn purge_other_sessions(&self) -> Result<u64, Error> {
        let session_id = self.session_id.clone();
        let count = self
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM session_items WHERE session_id != ?1", params![session_id])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)?;

        if count > 0 {
            tracing::debug!(deleted = count, "purged items from previous sessions");
        }
        Ok(count)
    }
}

fn checked_session_id(session_id: String) -> Result<String, Error> {
    if session_id.is_empty() {
        return Err(Error::InvalidInput("session id must not be empty".into()));
    }
    Ok(session_id)
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn get_item(&self, name: &str) -> Result<Option<String>, Error> {
        let session_id = self.session_id.clone();
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let value = conn
                    .query_row(
                        "SELECT value FROM session_items WHERE session_id = ?1 AND name = ?2",
                        params![session_id, name],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(Error::from)
    }

    async fn set_item(&self, name: &str, value: String) -> Result<(), Error> {
        let session_id = self.session_id.clone();
        let name = name.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO session_items (session_id, name, value, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(session_id, name) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![session_id, name, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn remove_item(&self, name: &str) -> Result<(), Error> {
        let session_id = self.session_id.clone();
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "DELETE FROM session_items WHERE session_id = ?1 AND name = ?2",
                    params![session_id, name],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
