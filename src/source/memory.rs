//! In-memory [`TaskSource`] for driver tests.
//!
//! A deterministic stand-in for the Redis source. Entries live in insertion
//! order, the scan cursor is a plain offset into the list of matching keys,
//! and exhaustion is signalled by handing back the start marker -- the same
//! full-circle contract the real store honors. Fetch failures can be
//! injected to exercise the driver's page-skip policy.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::constants::{KEY_PREFIX, SCAN_CURSOR_START};

use super::{ScanPage, SourceError, TaskSource};

/// Deterministic in-memory cache source.
#[derive(Debug)]
pub struct InMemorySource {
    entries: Vec<(String, Option<String>)>,
    page_size: usize,
    fail_fetch: AtomicBool,
}

impl InMemorySource {
    /// Creates an empty source that returns at most `page_size` keys per
    /// scan page.
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            page_size,
            fail_fetch: AtomicBool::new(false),
        }
    }

    /// Stores `value` under `key`, replacing any existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key.into(), Some(value.into()));
    }

    /// Registers `key` with no value: it shows up in scans but multi-gets
    /// return `None` for its slot, like a key deleted between scan and
    /// fetch.
    pub fn insert_missing(&mut self, key: impl Into<String>) {
        self.put(key.into(), None);
    }

    /// Makes every subsequent [`fetch_raw`](TaskSource::fetch_raw) fail.
    pub fn fail_fetches(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    fn put(&mut self, key: String, value: Option<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    fn matching_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(KEY_PREFIX))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[async_trait]
impl TaskSource for InMemorySource {
    async fn scan_page(&self, cursor: u64) -> Result<ScanPage, SourceError> {
        let keys = self.matching_keys();
        let start = (cursor as usize).min(keys.len());
        let end = (start + self.page_size).min(keys.len());
        let page: Vec<String> = keys[start..end].iter().map(|k| (*k).to_string()).collect();
        let next = if end >= keys.len() {
            SCAN_CURSOR_START
        } else {
            end as u64
        };
        Ok(ScanPage { cursor: next, keys: page })
    }

    async fn fetch_raw(&self, keys: &[String]) -> Result<Vec<Option<String>>, SourceError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SourceError::Fetch {
                count: keys.len(),
                message: "injected fetch failure".to_string(),
                source: None,
            });
        }
        Ok(keys
            .iter()
            .map(|key| {
                self.entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.clone())
            })
            .collect())
    }
}
