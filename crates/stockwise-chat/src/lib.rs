//! Conversational response engine for StockWise.
//!
//! Answers investing questions either from a keyword rule table with canned
//! replies and example charts, or by proxying to an external streaming
//! text-generation service.

pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod generation;
pub mod types;

pub use catalog::ResponseCatalog;
pub use classifier::IntentClassifier;
pub use engine::{GenerativeResponder, ResponseEngine, RuleResponder, Strategy};
pub use error::ChatError;
pub use generation::{
    AssembledReply, Completion, GenerationError, StreamingGenerationClient, TextGenerator,
    TransportFailure,
};
pub use types::{AxisValue, ChartSpec, ChatReply, Intent};
