// Pairing HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult, AppState};

/// Pairing request body
#[derive(Debug, Deserialize)]
pub struct PairRequest {
    pub number: String,
}

/// Pairing response: the code the user enters on their phone
#[derive(Debug, Serialize)]
pub struct PairResponse {
    pub success: bool,
    pub code: String,
    pub number: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: String,
}

/// Pair a phone number (JSON body)
pub async fn pair(
    State(state): State<AppState>,
    Json(req): Json<PairRequest>,
) -> AppResult<Json<PairResponse>> {
    perform_pairing(&state, &req.number).await
}

/// Pair a phone number (legacy path parameter, GET /link/pair/{number})
pub async fn pair_legacy(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> AppResult<Json<PairResponse>> {
    perform_pairing(&state, &number).await
}

async fn perform_pairing(state: &AppState, raw_number: &str) -> AppResult<Json<PairResponse>> {
    if raw_number.trim().is_empty() {
        return Err(AppError::bad_request("Phone number cannot be empty"));
    }

    let outcome = state.session_service.pair(raw_number).await?;

    Ok(Json(PairResponse {
        success: true,
        code: outcome.code,
        number: outcome.number,
    }))
}

/// Disconnect and delete every session
pub async fn delete_all_sessions(
    State(state): State<AppState>,
) -> AppResult<Json<DeleteResponse>> {
    state.session_service.delete_all().await?;
    Ok(Json(DeleteResponse {
        status: "All Sessions Deleted".to_string(),
    }))
}
