//! Integration tests for otpcast-core repositories
//!
//! These tests run against an in-memory SQLite database with the real
//! migrations applied.
//!
//! Run with: cargo test --test integration_tests

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use otpcast_core::cache::IdentityCache;
use otpcast_core::repository::{
    DeviceRepository, IdentityLinkRepository, SentHistoryRepository, UserSettingsRepository,
};

const DEFAULT_LINK: &str = "https://example.com/join";

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    otpcast_core::MIGRATOR.run(&pool).await.expect("migrations");
    pool
}

#[tokio::test]
async fn test_settings_roundtrip() {
    let pool = test_pool().await;
    let repo = UserSettingsRepository::new(pool, DEFAULT_LINK.to_string());

    // Missing row: empty channels, default link
    let settings = repo.get("923001234567").await.expect("get");
    assert!(settings.channels.is_empty());
    assert_eq!(settings.custom_link, DEFAULT_LINK);

    repo.add_channel("923001234567", "channel-a").await.expect("add");
    repo.add_channel("923001234567", "channel-b").await.expect("add");
    repo.set_custom_link("923001234567", "https://example.com/mine")
        .await
        .expect("set link");

    let settings = repo.get("923001234567").await.expect("get");
    assert_eq!(settings.channels, vec!["channel-a", "channel-b"]);
    assert_eq!(settings.custom_link, "https://example.com/mine");
}

#[tokio::test]
async fn test_settings_no_duplicate_channels() {
    let pool = test_pool().await;
    let repo = UserSettingsRepository::new(pool, DEFAULT_LINK.to_string());

    repo.add_channel("u", "channel-a").await.expect("add");
    assert!(repo.add_channel("u", "channel-a").await.is_err());

    let settings = repo.get("u").await.expect("get");
    assert_eq!(settings.channels.len(), 1);
}

#[tokio::test]
async fn test_settings_remove_is_checked() {
    let pool = test_pool().await;
    let repo = UserSettingsRepository::new(pool, DEFAULT_LINK.to_string());

    repo.add_channel("u", "channel-a").await.expect("add");
    repo.remove_channel("u", "channel-a").await.expect("remove");
    // Removing again errors, and the list stays empty
    assert!(repo.remove_channel("u", "channel-a").await.is_err());
    assert!(repo.get("u").await.expect("get").channels.is_empty());
}

#[tokio::test]
async fn test_settings_users_are_isolated() {
    let pool = test_pool().await;
    let repo = UserSettingsRepository::new(pool, DEFAULT_LINK.to_string());

    repo.add_channel("alice", "channel-a").await.expect("add");
    repo.add_channel("bob", "channel-b").await.expect("add");

    assert_eq!(repo.get("alice").await.expect("get").channels, vec!["channel-a"]);
    assert_eq!(repo.get("bob").await.expect("get").channels, vec!["channel-b"]);
}

#[tokio::test]
async fn test_sent_history_dedup() {
    let pool = test_pool().await;
    let repo = SentHistoryRepository::new(pool);

    let key = "923001234567_2026-08-29 10:00:01";
    assert!(!repo.is_sent(key).await.expect("is_sent"));

    repo.mark_sent(key).await.expect("mark");
    assert!(repo.is_sent(key).await.expect("is_sent"));

    // Insert-once: marking again is a no-op, not an error
    repo.mark_sent(key).await.expect("mark again");
    assert!(repo.is_sent(key).await.expect("is_sent"));
}

#[tokio::test]
async fn test_sent_history_prune() {
    let pool = test_pool().await;
    let repo = SentHistoryRepository::new(pool);

    repo.mark_sent("old-key").await.expect("mark");

    // Nothing is older than a cutoff in the past
    let pruned = repo
        .prune_older_than(Utc::now() - Duration::days(1))
        .await
        .expect("prune");
    assert_eq!(pruned, 0);

    // A future cutoff removes the row
    let pruned = repo
        .prune_older_than(Utc::now() + Duration::days(1))
        .await
        .expect("prune");
    assert_eq!(pruned, 1);
    assert!(!repo.is_sent("old-key").await.expect("is_sent"));
}

#[tokio::test]
async fn test_identity_links_reload_into_cache() {
    let pool = test_pool().await;
    let repo = IdentityLinkRepository::new(pool);

    repo.upsert("111222333@lid", "923001234567").await.expect("upsert");
    repo.upsert("444555666@lid", "923007654321").await.expect("upsert");
    // Re-pairing moves the lid to a new phone
    repo.upsert("111222333@lid", "923000000000").await.expect("upsert");

    let cache = IdentityCache::new();
    let count = cache.reload(&repo).await.expect("reload");
    assert_eq!(count, 2);

    assert_eq!(cache.resolve("111222333@lid").await, "923000000000");
    assert_eq!(cache.resolve("444555666").await, "923007654321");
    assert_eq!(cache.resolve("unknown").await, "unknown");
}

#[tokio::test]
async fn test_devices_lifecycle() {
    let pool = test_pool().await;
    let repo = DeviceRepository::new(pool);

    repo.insert("923001234567").await.expect("insert");
    repo.insert("923007654321").await.expect("insert");
    // Re-pairing the same phone does not duplicate the row
    repo.insert("923001234567").await.expect("insert");

    let phones = repo.list_phones().await.expect("list");
    assert_eq!(phones.len(), 2);

    repo.delete("923001234567").await.expect("delete");
    assert_eq!(repo.list_phones().await.expect("list"), vec!["923007654321"]);

    assert_eq!(repo.delete_all().await.expect("delete all"), 1);
    assert!(repo.list_phones().await.expect("list").is_empty());
}
