//! # firstlight-store
//!
//! Append-only libSQL audit store for the Firstlight pipeline.
//!
//! Three record kinds — alerts received, decisions, registry actions — each
//! committed durably and immediately (no batching) so a crash mid-pipeline
//! leaves a consistent prefix of completed steps. The store is the source of
//! truth for submission idempotency: the duplicate resolver's local layer is
//! a read against `registry_actions`.

pub mod audit;
pub mod error;
pub mod helpers;
mod migrations;

use error::StoreError;
use libsql::Builder;

/// Handle to the audit database.
///
/// Every write is a single committed statement; no updates or deletes are
/// ever performed.
pub struct AuditStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl AuditStore {
    /// Open (or create) a local database at the given path.
    ///
    /// Runs migrations automatically on first open and switches the journal
    /// to WAL so concurrent process instances serialize on commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrations
    /// fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // journal_mode returns a row, so query rather than execute.
        let mut rows = conn.query("PRAGMA journal_mode=WAL", ()).await?;
        let _ = rows.next().await?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
