pub mod config;
pub mod error;

pub use config::{EngineMode, StockwiseConfig};
pub use error::{Result, StockwiseError};
