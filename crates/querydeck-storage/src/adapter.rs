// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configured entry point to the SQLite document store.

use tokio::sync::OnceCell;
use tracing::debug;

use querydeck_config::model::StorageConfig;
use querydeck_core::{HealthStatus, QuerydeckError};

use crate::collection::SqliteCollection;
use crate::database::Database;

/// SQLite-backed document store.
///
/// The database is opened lazily by [`SqliteStore::initialize`]; collection
/// handles share its single background connection.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Creates a store for the given configuration without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, QuerydeckError> {
        self.db
            .get()
            .ok_or_else(|| QuerydeckError::storage("storage not initialized -- call initialize() first"))
    }

    /// Opens the database and applies migrations.
    pub async fn initialize(&self) -> Result<(), QuerydeckError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| QuerydeckError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite document store initialized");
        Ok(())
    }

    /// Returns a handle to the named collection.
    pub fn collection(&self, name: &str) -> Result<SqliteCollection, QuerydeckError> {
        Ok(SqliteCollection::new(self.db()?.clone(), name))
    }

    pub async fn health_check(&self) -> HealthStatus {
        match self.db.get() {
            Some(db) => db.health_check().await,
            None => HealthStatus::Unhealthy("storage not initialized".to_string()),
        }
    }

    /// Checkpoints the WAL. Safe to call when never initialized.
    pub async fn close(&self) -> Result<(), QuerydeckError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}
