//! OTP monitor: the poll / dedup / broadcast pipeline.

pub mod feed;
pub mod message;

pub use feed::parse_feed;
pub use message::Notification;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::repository::{SentHistoryRepository, UserSettingsRepository};
use crate::transport::{ChatTransport, SessionRegistry};
use crate::Result;

/// Polls the configured feeds, deduplicates records and fans formatted
/// notifications out to every logged-in session with destinations.
pub struct OtpMonitor {
    http: reqwest::Client,
    feeds: Vec<String>,
    interval: Duration,
    history: SentHistoryRepository,
    settings: UserSettingsRepository,
    registry: Arc<SessionRegistry>,
    transport: Arc<dyn ChatTransport>,
}

impl OtpMonitor {
    pub fn new(
        config: &MonitorConfig,
        history: SentHistoryRepository,
        settings: UserSettingsRepository,
        registry: Arc<SessionRegistry>,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            feeds: config.feed_urls.clone(),
            interval: Duration::from_secs(config.interval_seconds.max(1)),
            history,
            settings,
            registry,
            transport,
        })
    }

    /// Run the poll loop until the shutdown signal fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(feeds = self.feeds.len(), "OTP monitor started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_cycle().await;
                }
                _ = shutdown.changed() => {
                    info!("OTP monitor stopping");
                    return;
                }
            }
        }
    }

    /// One pass over every configured feed. Feed failures are swallowed
    /// per poll; the next tick tries again from scratch.
    pub async fn poll_cycle(&self) {
        for (i, url) in self.feeds.iter().enumerate() {
            if let Err(e) = self.poll_feed(url, i + 1).await {
                debug!(feed = i + 1, error = %e, "Feed poll failed");
            }
        }
    }

    async fn poll_feed(&self, url: &str, feed_index: usize) -> Result<()> {
        let body: serde_json::Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for record in parse_feed(&body) {
            let key = record.dedup_key();
            match self.history.is_sent(&key).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Dedup lookup failed, skipping record");
                    continue;
                }
            }

            let notification = Notification::from_record(&record, feed_index);
            self.broadcast(&notification).await;

            // Seen regardless of delivery outcome
            if let Err(e) = self.history.mark_sent(&key).await {
                error!(error = %e, key, "Failed to mark record as sent");
            } else {
                info!(feed = feed_index, phone = %notification.masked_phone, "Record broadcast");
            }
        }

        Ok(())
    }

    /// Fan one notification out to every logged-in session with a
    /// non-empty channel list. Sends are fire-and-forget tasks; failures
    /// are logged, never retried.
    async fn broadcast(&self, notification: &Notification) {
        for session in self.registry.logged_in_sessions() {
            let settings = match self.settings.get(session.as_str()).await {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(session = %session, error = %e, "Settings lookup failed");
                    continue;
                }
            };
            if !settings.has_channels() {
                continue;
            }

            let body = notification.render(&settings.custom_link);
            for channel in settings.channels {
                let transport = Arc::clone(&self.transport);
                let session = session.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    if let Err(e) = transport.send_text(&session, &channel, &body).await {
                        error!(session = %session, channel, error = %e, "Send failed");
                    }
                });
            }
        }
    }
}

/// Periodically prune sent-history rows past the retention window.
pub async fn run_history_prune(
    history: SentHistoryRepository,
    retention_days: u32,
    mut shutdown: watch::Receiver<bool>,
) {
    // A few sweeps per day is plenty for this table
    let mut ticker = tokio::time::interval(Duration::from_secs(6 * 60 * 60));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
                match history.prune_older_than(cutoff).await {
                    Ok(pruned) if pruned > 0 => info!(pruned, "Sent-history retention sweep"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Sent-history prune failed"),
                }
            }
            _ = shutdown.changed() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionId, SmsRecord};
    use crate::test_helpers::memory_pool;
    use crate::transport::MockChatTransport;
    use mockall::predicate::*;

    fn sample_record() -> SmsRecord {
        SmsRecord {
            time: "2026-08-29 10:00:01".to_string(),
            country: "Pakistan".to_string(),
            phone: "923001234567".to_string(),
            service: "telegram".to_string(),
            text: "Your code is 48291".to_string(),
        }
    }

    async fn monitor_with(
        transport: MockChatTransport,
        registry: Arc<SessionRegistry>,
    ) -> (OtpMonitor, sqlx::SqlitePool) {
        let pool = memory_pool().await;
        let history = SentHistoryRepository::new(pool.clone());
        let settings =
            UserSettingsRepository::new(pool.clone(), "https://example.com/join".to_string());
        let monitor = OtpMonitor::new(
            &MonitorConfig::default(),
            history,
            settings,
            registry,
            Arc::new(transport),
        )
        .expect("monitor");
        (monitor, pool)
    }

    #[tokio::test]
    async fn test_broadcast_skips_users_without_channels() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(SessionId::from_raw("923001234567"), true);

        // No channels configured for the user, so no sends happen
        let mut transport = MockChatTransport::new();
        transport.expect_send_text().times(0);

        let (monitor, _pool) = monitor_with(transport, registry).await;
        let notification = Notification::from_record(&sample_record(), 1);
        monitor.broadcast(&notification).await;
    }

    #[tokio::test]
    async fn test_broadcast_sends_to_each_channel() {
        let registry = Arc::new(SessionRegistry::new());
        let session = SessionId::from_raw("923001234567");
        registry.register(session.clone(), true);

        let mut transport = MockChatTransport::new();
        transport
            .expect_send_text()
            .with(eq(session.clone()), eq("channel-a"), always())
            .times(1)
            .returning(|_, _, _| Ok(()));
        transport
            .expect_send_text()
            .with(eq(session), eq("channel-b"), always())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (monitor, pool) = monitor_with(transport, registry).await;
        let settings =
            UserSettingsRepository::new(pool, "https://example.com/join".to_string());
        settings
            .add_channel("923001234567", "channel-a")
            .await
            .expect("add channel");
        settings
            .add_channel("923001234567", "channel-b")
            .await
            .expect("add channel");

        let notification = Notification::from_record(&sample_record(), 1);
        monitor.broadcast(&notification).await;

        // Let the spawned send tasks run to completion
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_logged_out_sessions_are_skipped() {
        let registry = Arc::new(SessionRegistry::new());
        registry.register(SessionId::from_raw("923001234567"), false);

        let mut transport = MockChatTransport::new();
        transport.expect_send_text().times(0);

        let (monitor, pool) = monitor_with(transport, registry).await;
        let settings =
            UserSettingsRepository::new(pool, "https://example.com/join".to_string());
        settings
            .add_channel("923001234567", "channel-a")
            .await
            .expect("add channel");

        let notification = Notification::from_record(&sample_record(), 1);
        monitor.broadcast(&notification).await;
    }
}
