//! API error types and JSON error response formatting.
//!
//! Every failure of `/chat` is rendered as
//! `{"error": "...", "status": <upstream code>?, "details": "..."?}` with an
//! HTTP status that tells the caller whether to fix the input (4xx), retry
//! (500/504) or treat the generation service as misbehaving (502).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use stockwise_chat::{ChatError, GenerationError};

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Status code returned by the generation service, if that is the cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Extra context (bounded upstream body excerpt or transport cause).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or empty message.
    BadRequest(String),
    /// 500 Internal Server Error - transport failure or unexpected error.
    Internal { message: String, details: Option<String> },
    /// 502 Bad Gateway - generation service answered with a failure status.
    BadGateway { status: u16, details: String },
    /// 504 Gateway Timeout - reply not ready within the request deadline.
    GatewayTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    status: None,
                    details: None,
                },
            ),
            ApiError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: message,
                    status: None,
                    details,
                },
            ),
            ApiError::BadGateway { status, details } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: "Generation service returned an error status".to_string(),
                    status: Some(status),
                    details: Some(details),
                },
            ),
            ApiError::GatewayTimeout(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody {
                    error: msg,
                    status: None,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest("No message provided".to_string()),
            ChatError::Generation(GenerationError::UpstreamStatus { code, body_excerpt }) => {
                ApiError::BadGateway {
                    status: code,
                    details: body_excerpt,
                }
            }
            ChatError::Generation(GenerationError::Transport(failure)) => ApiError::Internal {
                message: "Generation request failed".to_string(),
                details: Some(failure.to_string()),
            },
            ChatError::DeadlineExceeded(_) => ApiError::GatewayTimeout(err.to_string()),
            ChatError::Config(msg) => ApiError::Internal {
                message: msg,
                details: None,
            },
        }
    }
}
