//! Cache-store access: the [`TaskSource`] trait and its implementations.
//!
//! A source is a dumb transport -- no parsing, no filtering. The driver
//! layers the record codec and the drop policy on top of the two raw
//! operations: a prefix scan that pages through matching keys, and a
//! multi-get that fetches raw values in key order.
//!
//! # Implementations
//!
//! - [`RedisSource`] -- the production source, `SCAN`/`MGET` over a
//!   multiplexed connection.
//! - [`InMemorySource`] -- deterministic fake for driver tests, with
//!   failure injection.

pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::memory::InMemorySource;
pub use self::redis::RedisSource;

/// One page of a prefix scan: the cursor to resume from plus the matching
/// keys returned with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next scan call. Equal to
    /// [`SCAN_CURSOR_START`](crate::constants::SCAN_CURSOR_START) when the
    /// iteration has come full circle.
    pub cursor: u64,
    /// Keys matching the task prefix in this page. Any page, including an
    /// intermediate one, may be empty.
    pub keys: Vec<String>,
}

/// Errors from the cache store.
///
/// The driver contains [`Fetch`](SourceError::Fetch) failures to the page
/// they occurred in; [`Connect`](SourceError::Connect) and
/// [`Scan`](SourceError::Scan) failures end the run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The connection could not be established at startup.
    #[error("failed to connect to cache store: {message}")]
    Connect {
        /// Human-readable description of the failure.
        message: String,
        /// The underlying client error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A scan call failed.
    #[error("scan failed at cursor {cursor}: {message}")]
    Scan {
        /// The cursor the failed call was issued with.
        cursor: u64,
        /// Human-readable description of the failure.
        message: String,
        /// The underlying client error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A multi-get call failed.
    #[error("multi-get of {count} keys failed: {message}")]
    Fetch {
        /// How many keys the failed call asked for.
        count: usize,
        /// Human-readable description of the failure.
        message: String,
        /// The underlying client error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Read access to the cache store holding serialized task records.
#[async_trait]
pub trait TaskSource {
    /// Fetches the next page of keys matching the task prefix.
    ///
    /// Passing [`SCAN_CURSOR_START`](crate::constants::SCAN_CURSOR_START)
    /// starts an iteration; a returned [`ScanPage::cursor`] equal to the
    /// start marker signals completion. The page-size hint is advisory:
    /// pages may be empty or larger than the hint.
    async fn scan_page(&self, cursor: u64) -> Result<ScanPage, SourceError>;

    /// Fetches raw values for `keys`, one slot per key in matching order.
    ///
    /// A key with no value comes back as `None` in its slot. Callers must
    /// not issue empty requests; the driver short-circuits those.
    async fn fetch_raw(&self, keys: &[String]) -> Result<Vec<Option<String>>, SourceError>;
}
