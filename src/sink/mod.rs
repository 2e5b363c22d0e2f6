//! Relational-store access: the [`TaskSink`] trait and its implementations.
//!
//! A sink exposes exactly one write operation: a bulk insert that silently
//! skips rows whose primary key already exists. First write wins; the
//! pipeline never updates an existing destination row.
//!
//! # Implementations
//!
//! - [`MySqlSink`] -- the production sink, one multi-row `INSERT IGNORE`
//!   statement per batch.
//! - [`InMemorySink`] -- first-write-wins map for driver tests, with
//!   failure injection.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;

pub use self::memory::InMemorySink;
pub use self::mysql::MySqlSink;

use crate::record::TaskRow;

/// Errors from the relational store.
///
/// The driver contains [`Insert`](SinkError::Insert) failures to the page
/// they occurred in; [`Connect`](SinkError::Connect) failures end the run.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The connection could not be established at startup.
    #[error("failed to connect to relational store: {message}")]
    Connect {
        /// Human-readable description of the failure.
        message: String,
        /// The underlying client error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A bulk insert statement failed. The statement is all-or-nothing:
    /// no row-level retry, no partial commit.
    #[error("bulk insert of {count} rows failed: {message}")]
    Insert {
        /// How many rows the failed statement carried.
        count: usize,
        /// Human-readable description of the failure.
        message: String,
        /// The underlying client error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Write access to the durable destination table.
#[async_trait]
pub trait TaskSink {
    /// Inserts `rows` in one statement, silently skipping rows whose
    /// primary key already exists. Returns the engine-reported
    /// affected-row count, which is less than `rows.len()` when duplicates
    /// were ignored.
    ///
    /// Empty input is a no-op returning 0 with no store call.
    async fn insert_ignore(&self, rows: &[TaskRow]) -> Result<u64, SinkError>;

    /// Releases the underlying connection. Default is a no-op; pooled
    /// implementations override it to close cleanly.
    async fn close(&self) {}
}
