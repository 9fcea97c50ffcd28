//! Session lifecycle: startup reconnect, pairing, teardown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::IdentityCache;
use crate::models::{PairingCode, SessionId};
use crate::repository::{DeviceRepository, IdentityLinkRepository};
use crate::text::normalize_number;
use crate::transport::{ChatTransport, SessionRegistry};
use crate::{Error, Result};

/// Outcome of a pairing request: the code the user types on their phone.
#[derive(Debug, Clone)]
pub struct PairingOutcome {
    pub code: String,
    pub number: String,
}

/// Owns session bring-up and teardown against the gateway.
#[derive(Clone)]
pub struct SessionService {
    registry: Arc<SessionRegistry>,
    transport: Arc<dyn ChatTransport>,
    devices: DeviceRepository,
    identity_links: IdentityLinkRepository,
    identity: IdentityCache,
    login_wait: Duration,
}

impl SessionService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        transport: Arc<dyn ChatTransport>,
        devices: DeviceRepository,
        identity_links: IdentityLinkRepository,
        identity: IdentityCache,
        login_wait: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            devices,
            identity_links,
            identity,
            login_wait,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Reconnect every stored device, with a short stagger so a large
    /// session list does not slam the gateway at once.
    pub async fn connect_stored_sessions(&self) {
        let phones = match self.devices.list_phones().await {
            Ok(phones) => phones,
            Err(e) => {
                error!(error = %e, "Could not load stored sessions");
                return;
            }
        };
        info!(count = phones.len(), "Loading stored sessions");

        for phone in phones {
            let service = self.clone();
            let id = SessionId::from_raw(&phone);
            tokio::spawn(async move {
                if let Err(e) = service.connect_session(id.clone()).await {
                    error!(session = %id, error = %e, "Failed to connect session");
                }
            });
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    /// Connect one session and register it once the gateway reports it
    /// logged in.
    pub async fn connect_session(&self, id: SessionId) -> Result<()> {
        if self.registry.contains(&id) {
            return Ok(());
        }

        self.transport.connect(&id).await?;
        let logged_in = self.transport.is_logged_in(&id).await.unwrap_or(false);
        self.registry.register(id.clone(), logged_in);
        info!(session = %id, logged_in, "Session loaded");
        Ok(())
    }

    /// Pair a phone number.
    ///
    /// Any existing session for the number is torn down first (memory and
    /// store), then a pairing code is requested and a bounded background
    /// wait registers the session once login completes.
    pub async fn pair(&self, raw_number: &str) -> Result<PairingOutcome> {
        let number = normalize_number(raw_number);
        if number.is_empty() {
            return Err(Error::InvalidInput("Empty phone number".to_string()));
        }
        let id = SessionId::from_raw(&number);
        info!(number = %id, "Pairing requested");

        // Drop any previous session for this number
        if self.registry.remove(&id) {
            if let Err(e) = self.transport.disconnect(&id).await {
                warn!(session = %id, error = %e, "Disconnect of old session failed");
            }
        }
        if let Err(e) = self.transport.delete_session(&id).await {
            warn!(session = %id, error = %e, "Old session cleanup failed");
        }
        self.devices.delete(id.as_str()).await?;

        let PairingCode { code } = self.transport.begin_pairing(&number).await?;

        // Register in the background once the phone confirms the code
        let service = self.clone();
        let wait_id = id.clone();
        tokio::spawn(async move {
            service.wait_for_login(wait_id).await;
        });

        Ok(PairingOutcome {
            code,
            number: id.as_str().to_string(),
        })
    }

    /// Poll the gateway until the session logs in or the wait expires.
    async fn wait_for_login(&self, id: SessionId) {
        let attempts = self.login_wait.as_secs().max(1);
        for _ in 0..attempts {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if self.transport.is_logged_in(&id).await.unwrap_or(false) {
                info!(session = %id, "Paired successfully");
                self.registry.register(id.clone(), true);
                if let Err(e) = self.devices.insert(id.as_str()).await {
                    error!(session = %id, error = %e, "Failed to store device");
                }
                return;
            }
        }

        warn!(session = %id, "Pairing timed out, disconnecting");
        if let Err(e) = self.transport.disconnect(&id).await {
            warn!(session = %id, error = %e, "Disconnect after timeout failed");
        }
    }

    /// Disconnect and delete every session, in memory and in the stores.
    ///
    /// Covers stored devices that never made it into the registry (for
    /// example after a failed reconnect), so their gateway credentials go
    /// away too.
    pub async fn delete_all(&self) -> Result<usize> {
        let connected = self.registry.drain();

        for id in &connected {
            if let Err(e) = self.transport.disconnect(id).await {
                warn!(session = %id, error = %e, "Disconnect failed");
            }
            if let Err(e) = self.transport.delete_session(id).await {
                warn!(session = %id, error = %e, "Session delete failed");
            }
        }

        let mut count = connected.len();
        for phone in self.devices.list_phones().await? {
            let id = SessionId::from_raw(&phone);
            if connected.contains(&id) {
                continue;
            }
            count += 1;
            if let Err(e) = self.transport.delete_session(&id).await {
                warn!(session = %id, error = %e, "Stored session delete failed");
            }
        }

        self.devices.delete_all().await?;
        info!(count, "All sessions deleted");
        Ok(count)
    }

    /// Disconnect every session without deleting stored credentials
    /// (graceful shutdown path).
    pub async fn disconnect_all(&self) {
        for id in self.registry.drain() {
            if let Err(e) = self.transport.disconnect(&id).await {
                warn!(session = %id, error = %e, "Disconnect failed");
            }
        }
    }

    /// Record a LID alias reported by the gateway for a paired session.
    pub async fn record_identity(&self, lid: &str, phone: &str) -> Result<()> {
        self.identity_links.upsert(lid, phone).await?;
        self.identity.insert(lid, phone).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::memory_pool;
    use crate::transport::MockChatTransport;
    use mockall::predicate::*;

    async fn service_with(transport: MockChatTransport) -> SessionService {
        let pool = memory_pool().await;
        SessionService::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(transport),
            DeviceRepository::new(pool.clone()),
            IdentityLinkRepository::new(pool),
            IdentityCache::new(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_pair_rejects_empty_number() {
        let svc = service_with(MockChatTransport::new()).await;
        assert!(matches!(
            svc.pair("+ - ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_pair_normalizes_and_returns_code() {
        let mut transport = MockChatTransport::new();
        transport
            .expect_delete_session()
            .returning(|_| Ok(()));
        transport
            .expect_begin_pairing()
            .with(eq("923001234567"))
            .times(1)
            .returning(|_| {
                Ok(PairingCode {
                    code: "ABCD-1234".to_string(),
                })
            });
        transport
            .expect_is_logged_in()
            .returning(|_| Ok(true));
        transport.expect_disconnect().returning(|_| Ok(()));

        let svc = service_with(transport).await;
        let outcome = svc.pair("+92 300-1234567").await.expect("pairing");
        assert_eq!(outcome.code, "ABCD-1234");
        assert_eq!(outcome.number, "923001234567");
    }

    #[tokio::test]
    async fn test_connect_session_registers_once() {
        let mut transport = MockChatTransport::new();
        transport.expect_connect().times(1).returning(|_| Ok(()));
        transport
            .expect_is_logged_in()
            .returning(|_| Ok(true));

        let svc = service_with(transport).await;
        let id = SessionId::from_raw("923001234567");
        svc.connect_session(id.clone()).await.expect("connect");

        // Second call is a no-op: connect is only expected once
        svc.connect_session(id).await.expect("connect");
        assert_eq!(svc.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_covers_stored_unconnected_devices() {
        let mut transport = MockChatTransport::new();
        transport.expect_connect().returning(|_| Ok(()));
        transport.expect_is_logged_in().returning(|_| Ok(true));
        transport.expect_disconnect().returning(|_| Ok(()));
        // One connected session plus one device that never reconnected;
        // both must lose their gateway credentials
        transport
            .expect_delete_session()
            .with(eq(SessionId::from_raw("923000000000")))
            .times(1)
            .returning(|_| Ok(()));
        transport
            .expect_delete_session()
            .with(eq(SessionId::from_raw("923000000001")))
            .times(1)
            .returning(|_| Ok(()));

        let pool = memory_pool().await;
        let devices = DeviceRepository::new(pool.clone());
        devices.insert("923000000000").await.expect("insert");
        devices.insert("923000000001").await.expect("insert");

        let svc = SessionService::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(transport),
            devices.clone(),
            IdentityLinkRepository::new(pool),
            IdentityCache::new(),
            Duration::from_secs(1),
        );
        svc.connect_session(SessionId::from_raw("923000000000"))
            .await
            .expect("connect");

        let removed = svc.delete_all().await.expect("delete all");
        assert_eq!(removed, 2);
        assert!(devices.list_phones().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_clears_registry_and_devices() {
        let mut transport = MockChatTransport::new();
        transport.expect_connect().returning(|_| Ok(()));
        transport
            .expect_is_logged_in()
            .returning(|_| Ok(true));
        transport.expect_disconnect().returning(|_| Ok(()));
        transport.expect_delete_session().returning(|_| Ok(()));

        let svc = service_with(transport).await;
        svc.connect_session(SessionId::from_raw("111"))
            .await
            .expect("connect");

        let removed = svc.delete_all().await.expect("delete all");
        assert_eq!(removed, 1);
        assert!(svc.registry().is_empty());
    }
}
