//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use stockwise_chat::ResponseEngine;
use stockwise_core::config::StockwiseConfig;

/// Shared application state.
///
/// Everything is read-only after startup, so handlers share it through `Arc`
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<StockwiseConfig>,
    /// Response engine selected for this deployment.
    pub engine: Arc<ResponseEngine>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: StockwiseConfig, engine: ResponseEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            start_time: Instant::now(),
        }
    }
}
