//! StockWise API crate - axum HTTP surface for the chat engine.
//!
//! Exposes `POST /chat` plus a banner at `/` and a `/health` probe.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
