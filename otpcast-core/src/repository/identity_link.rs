//! Identity-link repository: stored LID-to-phone alias pairs.

use sqlx::{Row, SqlitePool};

use crate::models::IdentityAlias;
use crate::Result;

/// Identity-link repository
#[derive(Clone)]
pub struct IdentityLinkRepository {
    pool: SqlitePool,
}

impl IdentityLinkRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every stored alias pair.
    pub async fn list_all(&self) -> Result<Vec<IdentityAlias>> {
        let rows = sqlx::query("SELECT lid, phone FROM identity_links")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(IdentityAlias {
                    lid: row.try_get("lid")?,
                    phone: row.try_get("phone")?,
                })
            })
            .collect()
    }

    /// Store or replace an alias pair.
    pub async fn upsert(&self, lid: &str, phone: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO identity_links (lid, phone)
            VALUES (?, ?)
            ON CONFLICT(lid) DO UPDATE SET phone = excluded.phone
            ",
        )
        .bind(lid)
        .bind(phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
