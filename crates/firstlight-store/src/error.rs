//! Store error types.
//!
//! Storage failures are the only non-recoverable errors in the pipeline:
//! they propagate out of the daemon, and restart relies on the store's
//! durability to resume idempotently.

use thiserror::Error;

/// Errors from audit store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// A persisted row could not be decoded back into an entity.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}
