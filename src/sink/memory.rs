//! In-memory [`TaskSink`] for driver tests.
//!
//! A first-write-wins map keyed by row id, matching `INSERT IGNORE`
//! semantics: duplicates -- within a batch or across batches -- are
//! counted as attempted but never overwrite. Insert failures can be
//! injected to exercise the driver's page-skip policy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::record::TaskRow;

use super::{SinkError, TaskSink};

/// First-write-wins in-memory destination.
#[derive(Debug, Default)]
pub struct InMemorySink {
    rows: Mutex<HashMap<String, TaskRow>>,
    calls: AtomicU64,
    fail_insert: AtomicBool,
}

impl InMemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent non-empty
    /// [`insert_ignore`](TaskSink::insert_ignore) fail.
    pub fn fail_inserts(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }

    /// Number of insert statements that reached the store. Empty batches
    /// short-circuit and are not counted.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The stored row for `id`, if any.
    pub fn get(&self, id: &str) -> Option<TaskRow> {
        self.lock().get(id).cloned()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the sink holds no rows.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TaskRow>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TaskSink for InMemorySink {
    async fn insert_ignore(&self, rows: &[TaskRow]) -> Result<u64, SinkError> {
        if rows.is_empty() {
            return Ok(0);
        }
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(SinkError::Insert {
                count: rows.len(),
                message: "injected insert failure".to_string(),
                source: None,
            });
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.lock();
        let mut affected = 0;
        for row in rows {
            if !stored.contains_key(&row.id) {
                stored.insert(row.id.clone(), row.clone());
                affected += 1;
            }
        }
        Ok(affected)
    }
}
