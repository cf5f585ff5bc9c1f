// SPDX-FileCopyrightText: 2026 Querydeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary via
//! `embed_migrations!` and applied whenever a [`crate::Database`] opens.

use querydeck_core::QuerydeckError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Runs all pending migrations against the given connection.
///
/// Refinery records applied versions in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), QuerydeckError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(QuerydeckError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = migration.name(), "applied migration");
    }
    Ok(())
}
