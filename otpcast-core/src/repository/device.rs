//! Device repository: phone numbers with a stored messaging session.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::Result;

/// Device repository
#[derive(Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Phone numbers of every stored device, in pairing order.
    pub async fn list_phones(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT phone FROM devices ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(phone,)| phone).collect())
    }

    /// Record a paired device.
    pub async fn insert(&self, phone: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO devices (phone, created_at)
            VALUES (?, ?)
            ON CONFLICT(phone) DO NOTHING
            ",
        )
        .bind(phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drop the stored device for one phone.
    pub async fn delete(&self, phone: &str) -> Result<()> {
        sqlx::query("DELETE FROM devices WHERE phone = ?")
            .bind(phone)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop every stored device.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM devices")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
