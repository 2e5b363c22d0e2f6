//! One-shot migration of cached task records from Redis into MySQL.
//!
//! The whole program is a single linear pipeline: scan the cache for keys
//! carrying the [`constants::KEY_PREFIX`] prefix, fetch each page of values
//! in one multi-get, parse and filter them into [`MjTask`] records, and
//! bulk-insert the resulting column tuples with insert-or-ignore semantics.
//! There is no retry loop, no checkpoint beyond the live scan cursor, and
//! no concurrency -- one page is in flight at a time.
//!
//! Records already present in the destination table are silently skipped
//! (first write wins), which makes a re-run after a crash safe: the scan
//! starts over and `INSERT IGNORE` deduplicates.
//!
//! # Module Organization
//!
//! - [`record`] - the task record codec (decode + fixed-order column tuple)
//! - [`source`] - cache-store access ([`TaskSource`]: Redis and in-memory)
//! - [`sink`] - relational-store access ([`TaskSink`]: MySQL and in-memory)
//! - [`migrate`] - the scan driver and its per-page skip policy
//! - [`config`] - connection URLs from the process environment
//! - [`error`] - top-level error taxonomy
//! - [`constants`] - key prefix, scan hints, destination schema

pub mod config;
pub mod constants;
pub mod error;
pub mod migrate;
pub mod record;
pub mod sink;
pub mod source;

// Re-exports for ergonomic access
pub use config::{Config, ConfigError};
pub use error::MigrateError;
pub use migrate::{MigrationReport, Migrator};
pub use record::{MjTask, ParseError, TaskRow};
pub use sink::{SinkError, TaskSink};
pub use source::{ScanPage, SourceError, TaskSource};
