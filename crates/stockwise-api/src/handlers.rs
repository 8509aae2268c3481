//! Route handler functions for all API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use stockwise_chat::ChatReply;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mode: String,
    pub uptime_secs: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET / - plain-text banner naming the active engine.
pub async fn home(State(state): State<AppState>) -> String {
    format!(
        "StockWise AI Chatbot Backend ({} engine) is running!",
        state.engine.mode()
    )
}

/// GET /health - liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.engine.mode().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /chat - answer one message.
///
/// A missing, non-JSON or malformed body is treated like an empty message.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = match payload {
        Ok(Json(req)) => req.message,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable chat body");
            String::new()
        }
    };

    let reply = state.engine.handle(&message).await?;
    Ok(Json(reply))
}
