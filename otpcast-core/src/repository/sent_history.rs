//! Sent-history repository: global deduplication of broadcast records.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::Result;

/// Sent-history repository
#[derive(Clone)]
pub struct SentHistoryRepository {
    pool: SqlitePool,
}

impl SentHistoryRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a dedup key has been seen before.
    pub async fn is_sent(&self, key: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM sent_history WHERE msg_id = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Mark a dedup key as seen. Keys are insert-once; a concurrent
    /// duplicate insert is a no-op.
    pub async fn mark_sent(&self, key: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO sent_history (msg_id, created_at)
            VALUES (?, ?)
            ON CONFLICT(msg_id) DO NOTHING
            ",
        )
        .bind(key)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete history rows older than the cutoff. Returns the number of
    /// rows removed.
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sent_history WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        let pruned = result.rows_affected();
        if pruned > 0 {
            debug!(pruned, "Pruned sent-history rows");
        }
        Ok(pruned)
    }
}
