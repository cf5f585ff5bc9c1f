// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: PRAGMA setup, migrations, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread. Do NOT open additional connections for writes.

use std::path::Path;
use std::time::Duration;

use querydeck_core::{HealthStatus, QuerydeckError};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::migrations::run_migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Converts tokio-rusqlite errors into storage errors.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> QuerydeckError {
    QuerydeckError::storage(e)
}

/// Handle to the SQLite database. Cloning shares the same background connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, QuerydeckError> {
        Self::open_with(path, true).await
    }

    /// Opens the database file at `path`, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, QuerydeckError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(QuerydeckError::storage)?;
        }
        let conn = Connection::open(path).await.map_err(QuerydeckError::storage)?;
        let db = Self { conn };
        db.initialize(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database. Contents vanish on close.
    pub async fn open_in_memory() -> Result<Self, QuerydeckError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(QuerydeckError::storage)?;
        let db = Self { conn };
        db.initialize(false).await?;
        Ok(db)
    }

    async fn initialize(&self, wal_mode: bool) -> Result<(), QuerydeckError> {
        self.conn
            .call(move |conn| -> Result<Result<(), QuerydeckError>, rusqlite::Error> {
                if wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    if !mode.eq_ignore_ascii_case("wal") {
                        warn!(mode = %mode, "WAL mode unavailable, continuing");
                    }
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Ok(run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?
    }

    /// Returns the underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs a trivial query to confirm the connection is alive.
    pub async fn health_check(&self) -> HealthStatus {
        let result = self
            .conn
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await;
        match result {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), QuerydeckError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoints and closes the connection.
    pub async fn close(self) -> Result<(), QuerydeckError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(map_tr_err)
    }
}
