//! Error types for the chat engine.

use std::time::Duration;

use stockwise_core::StockwiseError;

use crate::generation::GenerationError;

/// Errors surfaced by [`crate::ResponseEngine::handle`].
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("reply was not ready within {0:?}")]
    DeadlineExceeded(Duration),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyMessage)
    }
}

impl From<StockwiseError> for ChatError {
    fn from(err: StockwiseError) -> Self {
        ChatError::Config(err.to_string())
    }
}
