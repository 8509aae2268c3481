//! Integration tests for the StockWise HTTP surface.
//!
//! Each test builds its own router over a fresh engine; the generative
//! configuration runs against a scripted in-memory generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use stockwise_api::create_router;
use stockwise_api::handlers::HealthResponse;
use stockwise_api::state::AppState;
use stockwise_chat::{
    GenerationError, Intent, ResponseCatalog, ResponseEngine, TextGenerator, TransportFailure,
};
use stockwise_core::config::{EngineMode, StockwiseConfig};

// =============================================================================
// Helpers
// =============================================================================

struct ScriptedGenerator {
    calls: AtomicUsize,
    outcome: Result<String, GenerationError>,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _user_text: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

fn scripted(outcome: Result<String, GenerationError>) -> Arc<ScriptedGenerator> {
    Arc::new(ScriptedGenerator {
        calls: AtomicUsize::new(0),
        outcome,
    })
}

fn rules_app() -> axum::Router {
    create_router(AppState::new(StockwiseConfig::default(), ResponseEngine::rules()))
}

fn generative_app(generator: Arc<ScriptedGenerator>) -> axum::Router {
    let mut config = StockwiseConfig::default();
    config.engine.mode = EngineMode::Generative;
    let engine = ResponseEngine::generative(generator, Duration::from_secs(5));
    create_router(AppState::new(config, engine))
}

fn post_chat(json: &str) -> Request<Body> {
    Request::post("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_home_banner_names_mode() {
    let resp = rules_app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.contains("StockWise AI"));
    assert!(text.contains("rules"));
}

#[tokio::test]
async fn test_health() {
    let resp = generative_app(scripted(Ok(String::new())))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.mode, "generative");
}

// =============================================================================
// Rules configuration
// =============================================================================

#[tokio::test]
async fn test_chat_candlestick_returns_reply_and_chart() {
    let resp = rules_app()
        .oneshot(post_chat(r#"{"message": "how to read candlestick charts"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let reply = json["reply"].as_str().unwrap();
    assert!(ResponseCatalog::new()
        .variants(Intent::CandlestickHelp)
        .contains(&reply));

    let chart = &json["chart"];
    assert_eq!(chart["type"], "candlestick");
    assert_eq!(chart["title"], "Example Candlestick Chart");
    for field in ["x", "open", "close", "high", "low"] {
        assert_eq!(chart[field].as_array().unwrap().len(), 5, "{field}");
    }
}

#[tokio::test]
async fn test_chat_pie_chart_for_portfolio() {
    let resp = rules_app()
        .oneshot(post_chat(r#"{"message": "how should I diversify my portfolio"}"#))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["chart"]["type"], "pie");
    assert_eq!(json["chart"]["labels"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_chat_greeting_has_null_chart() {
    let resp = rules_app()
        .oneshot(post_chat(r#"{"message": "Hello!"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["chart"].is_null());
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_chat_fallback_echoes_message() {
    let resp = rules_app()
        .oneshot(post_chat(r#"{"message": "  Are bonds safe?  "}"#))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert!(json["reply"].as_str().unwrap().contains("“Are bonds safe?”"));
}

#[tokio::test]
async fn test_chat_whitespace_is_400() {
    let resp = rules_app()
        .oneshot(post_chat(r#"{"message": "   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn test_chat_missing_field_is_400() {
    let resp = rules_app().oneshot(post_chat("{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_invalid_json_is_400() {
    let resp = rules_app().oneshot(post_chat("{not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "No message provided");
}

#[tokio::test]
async fn test_chat_long_message_is_answered() {
    let message = format!("tell me about gold {}", "x".repeat(5000));
    let body = serde_json::json!({ "message": message }).to_string();
    let resp = rules_app().oneshot(post_chat(&body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert!(json["reply"].as_str().unwrap().contains(&message));
    assert!(json["chart"].is_null());
}

#[tokio::test]
async fn test_chat_get_not_allowed() {
    let resp = rules_app()
        .oneshot(Request::get("/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Generative configuration
// =============================================================================

#[tokio::test]
async fn test_generative_reply() {
    let generator = scripted(Ok("SIPs invest a fixed amount monthly.".to_string()));
    let resp = generative_app(generator.clone())
        .oneshot(post_chat(r#"{"message": "what is a sip"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["reply"], "SIPs invest a fixed amount monthly.");
    assert!(json["chart"].is_null());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generative_whitespace_never_reaches_generator() {
    let generator = scripted(Ok("unused".to_string()));
    let resp = generative_app(generator.clone())
        .oneshot(post_chat(r#"{"message": " \n "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generative_upstream_status_is_502() {
    let generator = scripted(Err(GenerationError::UpstreamStatus {
        code: 500,
        body_excerpt: "model crashed".to_string(),
    }));
    let resp = generative_app(generator)
        .oneshot(post_chat(r#"{"message": "q"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["status"], 500);
    assert_eq!(json["details"], "model crashed");
}

#[tokio::test]
async fn test_generative_transport_failure_is_500() {
    let generator = scripted(Err(GenerationError::Transport(TransportFailure::Timeout)));
    let resp = generative_app(generator)
        .oneshot(post_chat(r#"{"message": "q"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "Generation request failed");
    assert_eq!(json["details"], "the generation service timed out");
    assert!(json.get("status").is_none());
}
