//! Messaging transport seam.
//!
//! The actual messaging protocol (connection, pairing handshake, message
//! encoding) lives in an external gateway; this trait is the boundary the
//! rest of the service programs against.

use async_trait::async_trait;

use crate::models::{PairingCode, SessionId};
use crate::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Bring a stored session online.
    async fn connect(&self, session: &SessionId) -> Result<()>;

    /// Take a session offline, keeping its stored credentials.
    async fn disconnect(&self, session: &SessionId) -> Result<()>;

    /// Remove a session and its stored credentials entirely.
    async fn delete_session(&self, session: &SessionId) -> Result<()>;

    /// Start pairing a phone number; returns the code the user enters on
    /// their phone.
    async fn begin_pairing(&self, number: &str) -> Result<PairingCode>;

    /// Whether the session completed login on the gateway side.
    async fn is_logged_in(&self, session: &SessionId) -> Result<bool>;

    /// Send a plain-text message from a session to a destination channel.
    async fn send_text(&self, session: &SessionId, to: &str, body: &str) -> Result<()>;
}
