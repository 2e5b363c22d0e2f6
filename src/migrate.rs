//! Scan driver: the linear pipeline copying task records from the cache
//! into the relational table.
//!
//! One page is in flight at a time. The driver owns the iteration state:
//! starting from the cursor origin, it pages through keys matching the task
//! prefix, runs fetch → parse/filter → transform → bulk insert for each
//! non-empty page, and terminates once the store hands the origin cursor
//! back (full circle).
//!
//! # Failure Policy
//!
//! A multi-get or insert failure inside a page is caught, logged, and
//! counted as a skipped page; the loop resumes from the last returned
//! cursor. A failure of the scan call itself ends the run -- there is no
//! cursor to continue from. Nothing is checkpointed: a crash loses the
//! in-memory cursor and a restart rescans from the origin, relying on the
//! sink's ignore-on-conflict semantics to deduplicate.

use tracing::{debug, info, warn};

use crate::constants::SCAN_CURSOR_START;
use crate::record::{MjTask, TaskRow};
use crate::sink::{SinkError, TaskSink};
use crate::source::{SourceError, TaskSource};

/// Counters accumulated across one full scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Scan pages seen, including empty ones.
    pub pages: u64,
    /// Keys returned across all pages.
    pub keys_scanned: u64,
    /// Values dropped before loading: missing at fetch time or failed to
    /// parse.
    pub values_dropped: u64,
    /// Rows handed to the bulk loader.
    pub rows_attempted: u64,
    /// Rows the destination engine reports as inserted (ignored duplicates
    /// excluded).
    pub rows_inserted: u64,
    /// Pages abandoned after a fetch or insert failure.
    pub pages_skipped: u64,
}

/// A failure contained to a single page. The driver logs it, counts the
/// page as skipped, and moves on.
#[derive(Debug, thiserror::Error)]
enum PageError {
    #[error(transparent)]
    Fetch(#[from] SourceError),
    #[error(transparent)]
    Insert(#[from] SinkError),
}

/// Drives the scan → fetch → parse/filter → transform → bulk-insert
/// pipeline over a [`TaskSource`] and a [`TaskSink`].
///
/// Owns both store handles for the lifetime of the run;
/// [`shutdown`](Migrator::shutdown) consumes the driver and releases them.
#[derive(Debug)]
pub struct Migrator<S, K> {
    source: S,
    sink: K,
}

impl<S: TaskSource, K: TaskSink + Sync> Migrator<S, K> {
    /// Creates a driver over the two store handles.
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// The cache-store handle.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The relational-store handle.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Runs one full scan over the task key space.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Scan`] (or, for a broken connection,
    /// whatever the source surfaces) only when the scan call itself fails;
    /// per-page fetch and insert failures are contained and show up in
    /// [`MigrationReport::pages_skipped`] instead.
    pub async fn run(&self) -> Result<MigrationReport, SourceError> {
        let mut report = MigrationReport::default();
        let mut cursor = SCAN_CURSOR_START;

        loop {
            let page = self.source.scan_page(cursor).await?;
            debug!(cursor, next = page.cursor, keys = page.keys.len(), "scan page");
            cursor = page.cursor;
            report.pages += 1;
            report.keys_scanned += page.keys.len() as u64;

            if !page.keys.is_empty() {
                if let Err(err) = self.process_page(&page.keys, &mut report).await {
                    warn!(error = %err, keys = page.keys.len(), "page skipped");
                    report.pages_skipped += 1;
                }
            }

            if cursor == SCAN_CURSOR_START {
                break;
            }
        }

        Ok(report)
    }

    /// Releases both store handles: the sink is closed explicitly, the
    /// source connection closes on drop.
    pub async fn shutdown(self) {
        self.sink.close().await;
    }

    async fn process_page(
        &self,
        keys: &[String],
        report: &mut MigrationReport,
    ) -> Result<(), PageError> {
        let records = self.fetch_and_filter(keys, report).await?;
        if records.is_empty() {
            info!(attempted = 0, "no loadable values in page");
            return Ok(());
        }

        let rows: Vec<TaskRow> = records.iter().map(MjTask::to_row).collect();
        report.rows_attempted += rows.len() as u64;
        let affected = self.sink.insert_ignore(&rows).await?;
        report.rows_inserted += affected;
        info!(attempted = rows.len(), affected, "inserted page");
        Ok(())
    }

    /// One multi-get for `keys`, keeping only values that parse as task
    /// records. Missing values are dropped silently; unparseable values
    /// are dropped and logged with the raw payload. Output preserves key
    /// order.
    async fn fetch_and_filter(
        &self,
        keys: &[String],
        report: &mut MigrationReport,
    ) -> Result<Vec<MjTask>, SourceError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.source.fetch_raw(keys).await?;
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            let Some(raw) = value else {
                report.values_dropped += 1;
                continue;
            };
            match MjTask::decode(&raw) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(error = %err, raw = %raw, "parse failed, dropping value");
                    report.values_dropped += 1;
                }
            }
        }
        Ok(records)
    }
}
