// Gateway webhook: inbound events from the messaging sidecar

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use otpcast_core::models::{InboundMessage, SessionId};

use super::{AppResult, AppState};

/// Events the gateway pushes to this service.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// An inbound chat message (possibly a dot-command).
    Message(InboundMessage),
    /// A session finished the pairing handshake; `lid` is the secondary
    /// identity the protocol assigned to the phone number.
    Paired { session: SessionId, lid: Option<String> },
    LoggedIn { session: SessionId },
    LoggedOut { session: SessionId },
    Disconnected { session: SessionId },
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Receive one gateway event.
pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<GatewayEvent>,
) -> AppResult<Json<WebhookAck>> {
    match event {
        GatewayEvent::Message(msg) => {
            if let Some(reply) = state.command_service.handle(&msg).await {
                if let Err(e) = state
                    .transport
                    .send_text(&msg.session, &msg.chat, &reply)
                    .await
                {
                    warn!(session = %msg.session, error = %e, "Command reply failed");
                }
            }
        }
        GatewayEvent::Paired { session, lid } => {
            debug!(session = %session, "Gateway reported pairing complete");
            state.session_service.registry().register(session.clone(), true);
            if let Some(lid) = lid {
                state
                    .session_service
                    .record_identity(&lid, session.as_str())
                    .await?;
            }
        }
        GatewayEvent::LoggedIn { session } => {
            state.session_service.registry().set_logged_in(&session, true);
        }
        GatewayEvent::LoggedOut { session } => {
            state.session_service.registry().set_logged_in(&session, false);
        }
        GatewayEvent::Disconnected { session } => {
            state.session_service.registry().remove(&session);
        }
    }

    Ok(Json(WebhookAck { ok: true }))
}
