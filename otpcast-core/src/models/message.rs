use serde::{Deserialize, Serialize};

use super::id::SessionId;

/// Inbound chat message delivered by the gateway webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InboundMessage {
    /// Session that received the message.
    pub session: SessionId,
    /// Raw sender id as reported by the gateway (may be a LID).
    pub sender: String,
    /// Chat the message arrived in; replies go back here.
    pub chat: String,
    /// Whether the session owner sent this message to themselves.
    #[serde(default)]
    pub from_self: bool,
    pub text: String,
}

/// Pairing code returned by the gateway for a phone-number link request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PairingCode {
    pub code: String,
}
