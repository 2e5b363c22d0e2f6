//! Redis implementation of [`TaskSource`].
//!
//! Maps the two trait operations directly onto the wire protocol:
//! `SCAN <cursor> MATCH mj-task-store::* COUNT 300` for key pages and
//! `MGET` for value batches. The full-circle cursor contract is Redis's
//! own: iteration is complete when `SCAN` hands back cursor `0`.
//!
//! # Connection Model
//!
//! `RedisSource` holds a [`MultiplexedConnection`], which is designed to be
//! cloned cheaply -- all clones share the same underlying TCP connection.
//! Each method clones the connection for the duration of the call. The
//! connection is released when the last clone is dropped; there is no
//! explicit close.

use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use async_trait::async_trait;

use crate::constants::{SCAN_COUNT, SCAN_MATCH};

use super::{ScanPage, SourceError, TaskSource};

/// Cache source backed by a Redis server.
#[derive(Debug, Clone)]
pub struct RedisSource {
    conn: MultiplexedConnection,
}

impl RedisSource {
    /// Connects to Redis at the given URL.
    ///
    /// The URL format is `redis://[:<password>@]<host>:<port>[/<db>]`.
    /// Fails fast if the connection cannot be established.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Connect`] if the client cannot be created or
    /// the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, SourceError> {
        let client = ::redis::Client::open(url).map_err(|e| SourceError::Connect {
            message: format!("failed to create Redis client: {e}"),
            source: Some(Box::new(e)),
        })?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SourceError::Connect {
                message: format!("failed to connect to Redis: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { conn })
    }

    /// Creates a source over a pre-built multiplexed connection.
    ///
    /// Useful when the caller manages connection lifecycle or needs custom
    /// connection configuration.
    pub fn with_connection(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TaskSource for RedisSource {
    async fn scan_page(&self, cursor: u64) -> Result<ScanPage, SourceError> {
        let mut conn = self.conn.clone();
        let (next, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(SCAN_MATCH)
            .arg("COUNT")
            .arg(SCAN_COUNT)
            .query_async(&mut conn)
            .await
            .map_err(|e| SourceError::Scan {
                cursor,
                message: format!("Redis SCAN error: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(ScanPage { cursor: next, keys })
    }

    async fn fetch_raw(&self, keys: &[String]) -> Result<Vec<Option<String>>, SourceError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        conn.mget(keys).await.map_err(|e| SourceError::Fetch {
            count: keys.len(),
            message: format!("Redis MGET error: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

// ---------------------------------------------------------------------------
// Integration tests -- live Redis
// ---------------------------------------------------------------------------

/// Integration tests for [`RedisSource`] against a real Redis instance.
///
/// These tests require:
/// - A running Redis instance (default: `redis://127.0.0.1:6379`)
/// - Set `REDIS_URL` environment variable to override the connection URL
///
/// Run with:
/// ```bash
/// cargo test --features redis-tests -- redis_
/// ```
///
/// Keys are written under the real task prefix with a UUID run marker in
/// the suffix, so concurrent test runs cannot collide; each test deletes
/// what it wrote.
#[cfg(all(test, feature = "redis-tests"))]
mod integration_tests {
    use crate::constants::{KEY_PREFIX, SCAN_CURSOR_START};

    use super::*;

    async fn test_source() -> (RedisSource, MultiplexedConnection) {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let client = ::redis::Client::open(url.as_str()).expect("invalid Redis URL");
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .expect("Redis connection failed -- is Redis running?");
        (RedisSource::with_connection(conn.clone()), conn)
    }

    #[tokio::test]
    async fn redis_scan_comes_full_circle_and_sees_written_keys() {
        let (source, mut conn) = test_source().await;
        let run = uuid::Uuid::new_v4();
        let keys: Vec<String> = (0..3).map(|i| format!("{KEY_PREFIX}{run}-{i}")).collect();
        for key in &keys {
            let _: () = conn.set(key, r#"{"id":"x"}"#).await.unwrap();
        }

        let mut cursor = SCAN_CURSOR_START;
        let mut seen = Vec::new();
        loop {
            let page = source.scan_page(cursor).await.unwrap();
            cursor = page.cursor;
            seen.extend(page.keys);
            if cursor == SCAN_CURSOR_START {
                break;
            }
        }
        for key in &keys {
            assert!(seen.contains(key), "scan did not return {key}");
        }

        let _: () = conn.del(&keys).await.unwrap();
    }

    #[tokio::test]
    async fn redis_fetch_raw_preserves_order_and_marks_missing() {
        let (source, mut conn) = test_source().await;
        let run = uuid::Uuid::new_v4();
        let present = format!("{KEY_PREFIX}{run}-present");
        let also_present = format!("{KEY_PREFIX}{run}-also");
        let missing = format!("{KEY_PREFIX}{run}-missing");
        let _: () = conn.set(&present, "first").await.unwrap();
        let _: () = conn.set(&also_present, "second").await.unwrap();

        let values = source
            .fetch_raw(&[present.clone(), missing, also_present.clone()])
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![
                Some("first".to_string()),
                None,
                Some("second".to_string()),
            ]
        );

        let _: () = conn.del(&[present, also_present]).await.unwrap();
    }
}
