// Module: http
// HTTP/JSON API: pairing, session admin, gateway webhook, landing page

pub mod error;
pub mod health;
pub mod pair;
pub mod public;
pub mod webhook;

#[cfg(test)]
pub mod test_support;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use otpcast_core::service::{CommandService, SessionService};
use otpcast_core::transport::ChatTransport;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub command_service: Arc<CommandService>,
    pub transport: Arc<dyn ChatTransport>,
}

/// Create the HTTP router with all routes
pub fn create_router(
    session_service: Arc<SessionService>,
    command_service: Arc<CommandService>,
    transport: Arc<dyn ChatTransport>,
) -> Router {
    let state = AppState {
        session_service,
        command_service,
        transport,
    };

    // The pairing page is embedded in other services' web frontends
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(public::index))
        .route("/api/pair", post(pair::pair))
        .route("/link/pair/{number}", get(pair::pair_legacy))
        .route("/link/delete", get(pair::delete_all_sessions).post(pair::delete_all_sessions))
        .route("/webhook/message", post(webhook::receive_event))
        .merge(health::create_health_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
