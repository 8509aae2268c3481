//! Response engine: validates a message and answers it with the strategy
//! this deployment was configured with.
//!
//! The strategy is fixed when the engine is built. Rules and generation are
//! never mixed within one call.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use stockwise_core::config::StockwiseConfig;
use stockwise_core::EngineMode;

use crate::catalog::ResponseCatalog;
use crate::classifier::IntentClassifier;
use crate::error::ChatError;
use crate::generation::{StreamingGenerationClient, TextGenerator};
use crate::types::ChatReply;

/// Keyword classifier plus canned catalog. Pure computation, never blocks.
#[derive(Default)]
pub struct RuleResponder {
    classifier: IntentClassifier,
    catalog: ResponseCatalog,
}

impl RuleResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    /// Answer an already validated message using `rng` for variant choice.
    pub fn respond_with<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> ChatReply {
        let intent = self.classifier.classify(message);
        ChatReply {
            reply: self.catalog.reply_with(intent, message, rng),
            chart: self.catalog.chart(intent).cloned(),
        }
    }

    pub fn respond(&self, message: &str) -> ChatReply {
        self.respond_with(message, &mut rand::rng())
    }
}

/// Delegates to a [`TextGenerator`] under an overall deadline.
pub struct GenerativeResponder {
    generator: Arc<dyn TextGenerator>,
    deadline: Duration,
}

impl GenerativeResponder {
    pub fn new(generator: Arc<dyn TextGenerator>, deadline: Duration) -> Self {
        Self {
            generator,
            deadline,
        }
    }

    /// Generate a reply for an already validated message.
    ///
    /// When the deadline elapses the in-flight generation future is dropped,
    /// which aborts the HTTP read; whatever was accumulated is discarded.
    pub async fn respond(&self, message: &str) -> Result<ChatReply, ChatError> {
        match tokio::time::timeout(self.deadline, self.generator.generate(message)).await {
            Ok(Ok(text)) => Ok(ChatReply::text(text)),
            Ok(Err(e)) => {
                warn!(error = %e, "Generation failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(deadline = ?self.deadline, "Generation cancelled at deadline");
                Err(ChatError::DeadlineExceeded(self.deadline))
            }
        }
    }
}

/// The strategy behind an engine.
pub enum Strategy {
    Rules(RuleResponder),
    Generative(GenerativeResponder),
}

/// Entry point for one chat message.
pub struct ResponseEngine {
    strategy: Strategy,
}

impl ResponseEngine {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Rule-based engine.
    pub fn rules() -> Self {
        Self::new(Strategy::Rules(RuleResponder::new()))
    }

    /// Generative engine over any [`TextGenerator`].
    pub fn generative(generator: Arc<dyn TextGenerator>, deadline: Duration) -> Self {
        Self::new(Strategy::Generative(GenerativeResponder::new(
            generator, deadline,
        )))
    }

    /// Build the engine selected by `config.engine.mode`.
    pub fn from_config(config: &StockwiseConfig) -> Result<Self, ChatError> {
        let engine = match config.engine.mode {
            EngineMode::Rules => Self::rules(),
            EngineMode::Generative => {
                let client = StreamingGenerationClient::new(&config.generation)?;
                Self::generative(
                    Arc::new(client),
                    Duration::from_secs(config.engine.request_deadline_secs),
                )
            }
        };
        info!(mode = %engine.mode(), "Response engine ready");
        Ok(engine)
    }

    pub fn mode(&self) -> EngineMode {
        match self.strategy {
            Strategy::Rules(_) => EngineMode::Rules,
            Strategy::Generative(_) => EngineMode::Generative,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Trim `text` and reject empty or whitespace-only input. Any other
    /// message is accepted regardless of length.
    pub fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ChatError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(message)
    }

    /// Answer one message.
    ///
    /// Validation runs first, so invalid input never reaches the classifier
    /// or the network.
    pub async fn handle(&self, text: &str) -> Result<ChatReply, ChatError> {
        let message = self.validate(text)?;
        debug!(mode = %self.mode(), chars = message.chars().count(), "Handling message");

        match &self.strategy {
            Strategy::Rules(rules) => Ok(rules.respond(message)),
            Strategy::Generative(generative) => generative.respond(message).await,
        }
    }
}
