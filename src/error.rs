//! Top-level error taxonomy.
//!
//! Only failures that end the run surface here: configuration, either
//! store's connect, or the scan call itself. Per-page fetch and insert
//! failures are contained by the driver (page skipped, loop continues),
//! and parse failures never leave the fetch-and-filter stage -- neither
//! appears as a [`MigrateError`].

use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::source::SourceError;

/// A failure that ends the migration run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Process configuration could not be resolved.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The cache store failed at connect or scan time.
    #[error("cache store error: {0}")]
    Source(#[from] SourceError),

    /// The relational store failed at connect time.
    #[error("relational store error: {0}")]
    Sink(#[from] SinkError),
}
