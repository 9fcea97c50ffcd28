//! User settings repository for database operations

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::models::UserSettings;
use crate::{Error, Result};

/// User settings repository
///
/// Mutations run inside a single transaction so two concurrent commands
/// for the same user serialize at the database instead of racing.
#[derive(Clone)]
pub struct UserSettingsRepository {
    pool: SqlitePool,
    default_link: String,
}

impl UserSettingsRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool, default_link: String) -> Self {
        Self { pool, default_link }
    }

    /// Get settings for a user. A missing row yields empty channels and
    /// the default footer link.
    pub async fn get(&self, jid: &str) -> Result<UserSettings> {
        let row = sqlx::query(
            r"
            SELECT jid, channels, custom_link, created_at, updated_at
            FROM user_settings
            WHERE jid = ?
            ",
        )
        .bind(jid)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.settings_from_row(&row),
            None => Ok(UserSettings::empty(jid, &self.default_link)),
        }
    }

    /// Add a destination channel. Errors if the channel is already in the
    /// user's list.
    pub async fn add_channel(&self, jid: &str, channel: &str) -> Result<UserSettings> {
        let mut tx = self.pool.begin().await?;

        let mut settings = self.fetch_in_tx(&mut tx, jid).await?;
        if settings.channels.iter().any(|c| c == channel) {
            return Err(Error::AlreadyExists("Channel already added".to_string()));
        }
        settings.channels.push(channel.to_string());
        settings.updated_at = Utc::now();

        Self::upsert_in_tx(&mut tx, &settings).await?;
        tx.commit().await?;

        debug!(jid, channel, "Channel added");
        Ok(settings)
    }

    /// Remove a destination channel. Errors if the channel is not in the
    /// user's list.
    pub async fn remove_channel(&self, jid: &str, channel: &str) -> Result<UserSettings> {
        let mut tx = self.pool.begin().await?;

        let mut settings = self.fetch_in_tx(&mut tx, jid).await?;
        let before = settings.channels.len();
        settings.channels.retain(|c| c != channel);
        if settings.channels.len() == before {
            return Err(Error::NotFound("Channel not found".to_string()));
        }
        settings.updated_at = Utc::now();

        Self::upsert_in_tx(&mut tx, &settings).await?;
        tx.commit().await?;

        debug!(jid, channel, "Channel removed");
        Ok(settings)
    }

    /// Replace the user's footer link.
    pub async fn set_custom_link(&self, jid: &str, link: &str) -> Result<UserSettings> {
        let mut tx = self.pool.begin().await?;

        let mut settings = self.fetch_in_tx(&mut tx, jid).await?;
        settings.custom_link = link.to_string();
        settings.updated_at = Utc::now();

        Self::upsert_in_tx(&mut tx, &settings).await?;
        tx.commit().await?;

        debug!(jid, link, "Footer link updated");
        Ok(settings)
    }

    async fn fetch_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        jid: &str,
    ) -> Result<UserSettings> {
        let row = sqlx::query(
            r"
            SELECT jid, channels, custom_link, created_at, updated_at
            FROM user_settings
            WHERE jid = ?
            ",
        )
        .bind(jid)
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => self.settings_from_row(&row),
            None => Ok(UserSettings::empty(jid, &self.default_link)),
        }
    }

    async fn upsert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        settings: &UserSettings,
    ) -> Result<()> {
        let channels = serde_json::to_string(&settings.channels)?;
        sqlx::query(
            r"
            INSERT INTO user_settings (jid, channels, custom_link, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(jid) DO UPDATE SET
                channels = excluded.channels,
                custom_link = excluded.custom_link,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&settings.jid)
        .bind(channels)
        .bind(&settings.custom_link)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    fn settings_from_row(&self, row: &sqlx::sqlite::SqliteRow) -> Result<UserSettings> {
        let channels_json: String = row.try_get("channels")?;
        let channels: Vec<String> = serde_json::from_str(&channels_json)?;
        let custom_link: String = row.try_get("custom_link")?;

        Ok(UserSettings {
            jid: row.try_get("jid")?,
            channels,
            custom_link: if custom_link.is_empty() {
                self.default_link.clone()
            } else {
                custom_link
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
