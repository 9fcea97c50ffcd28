//! Shared fixtures for handler tests: a recording transport stub and a
//! fully wired router over an in-memory database.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;

use otpcast_core::cache::IdentityCache;
use otpcast_core::models::{PairingCode, SessionId};
use otpcast_core::repository::{
    DeviceRepository, IdentityLinkRepository, UserSettingsRepository,
};
use otpcast_core::service::{CommandService, SessionService};
use otpcast_core::transport::{ChatTransport, SessionRegistry};
use otpcast_core::Result;

pub const TEST_DEFAULT_LINK: &str = "https://example.com/join";

/// Transport stub that records outbound calls for assertions.
#[derive(Default)]
pub struct StubTransport {
    pub sent: Mutex<Vec<(SessionId, String, String)>>,
    pub deleted: Mutex<Vec<SessionId>>,
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn connect(&self, _session: &SessionId) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self, _session: &SessionId) -> Result<()> {
        Ok(())
    }

    async fn delete_session(&self, session: &SessionId) -> Result<()> {
        self.deleted.lock().expect("lock").push(session.clone());
        Ok(())
    }

    async fn begin_pairing(&self, _number: &str) -> Result<PairingCode> {
        Ok(PairingCode {
            code: "ABCD-1234".to_string(),
        })
    }

    async fn is_logged_in(&self, _session: &SessionId) -> Result<bool> {
        Ok(false)
    }

    async fn send_text(&self, session: &SessionId, to: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .expect("lock")
            .push((session.clone(), to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestContext {
    pub router: Router,
    pub transport: Arc<StubTransport>,
    pub session_service: Arc<SessionService>,
    pub settings: UserSettingsRepository,
}

/// Router plus handles to its collaborators, over a fresh in-memory
/// database with migrations applied.
pub async fn test_context() -> TestContext {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    otpcast_core::MIGRATOR.run(&pool).await.expect("migrations");

    let transport = Arc::new(StubTransport::default());
    let identity = IdentityCache::new();
    let settings =
        UserSettingsRepository::new(pool.clone(), TEST_DEFAULT_LINK.to_string());

    let session_service = Arc::new(SessionService::new(
        Arc::new(SessionRegistry::new()),
        transport.clone(),
        DeviceRepository::new(pool.clone()),
        IdentityLinkRepository::new(pool),
        identity.clone(),
        Duration::from_secs(1),
    ));
    let command_service = Arc::new(CommandService::new(settings.clone(), identity));

    let router = super::create_router(
        Arc::clone(&session_service),
        command_service,
        transport.clone(),
    );

    TestContext {
        router,
        transport,
        session_service,
        settings,
    }
}
