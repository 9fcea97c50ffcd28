mod server;

use anyhow::Result;
use clap::Parser;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use otpcast_core::{
    cache::IdentityCache,
    logging,
    monitor::OtpMonitor,
    repository::{
        DeviceRepository, IdentityLinkRepository, SentHistoryRepository, UserSettingsRepository,
    },
    service::{CommandService, SessionService},
    transport::{ChatTransport, HttpGatewayTransport, SessionRegistry},
    Config,
};

use server::{OtpcastServer, Services};

#[derive(Parser, Debug)]
#[command(name = "otpcast", about = "OTP relay service")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "OTPCAST_CONFIG")]
    config: Option<String>,
}

/// Create the directory a sqlite database file lives in, so first boot on
/// an empty volume works.
fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let config = Config::load(args.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("otpcast starting...");
    info!("HTTP address: {}", config.http_address());

    if config.monitor.feed_urls.is_empty() {
        warn!("No feed URLs configured; the OTP monitor will idle");
    }

    // 3. Initialize database
    ensure_sqlite_dir(config.database_url())?;
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .connect(config.database_url())
        .await?;
    info!("Database connected");

    // 4. Run migrations
    otpcast_core::MIGRATOR.run(&pool).await?;
    info!("Migrations completed");

    // 5. Repositories and caches
    let settings_repo =
        UserSettingsRepository::new(pool.clone(), config.broadcast.default_link.clone());
    let history_repo = SentHistoryRepository::new(pool.clone());
    let device_repo = DeviceRepository::new(pool.clone());
    let identity_repo = IdentityLinkRepository::new(pool.clone());

    let identity_cache = IdentityCache::new();
    if let Err(e) = identity_cache.reload(&identity_repo).await {
        warn!(error = %e, "Identity cache initial load failed");
    }

    // 6. Transport and sessions
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpGatewayTransport::new(&config.gateway)?);
    let registry = Arc::new(SessionRegistry::new());

    let session_service = Arc::new(SessionService::new(
        Arc::clone(&registry),
        Arc::clone(&transport),
        device_repo,
        identity_repo,
        identity_cache.clone(),
        Duration::from_secs(config.gateway.pairing_login_timeout_seconds),
    ));
    let command_service = Arc::new(CommandService::new(settings_repo.clone(), identity_cache));

    // 7. Reconnect stored sessions (staggered, off the startup path)
    let bootstrap_service = Arc::clone(&session_service);
    tokio::spawn(async move {
        bootstrap_service.connect_stored_sessions().await;
    });

    // 8. OTP monitor
    let monitor = OtpMonitor::new(
        &config.monitor,
        history_repo.clone(),
        settings_repo,
        registry,
        Arc::clone(&transport),
    )?;

    // 9. Serve until shutdown
    let services = Services {
        session_service,
        command_service,
        transport,
        history: history_repo,
        monitor,
    };
    OtpcastServer::new(config, services).start().await
}
