use thiserror::Error;

/// Top-level error type for the StockWise system.
///
/// Subsystem crates define their own error types and convert from
/// `StockwiseError` where they need to surface configuration or I/O
/// failures through `?`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StockwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for StockwiseError {
    fn from(err: toml::de::Error) -> Self {
        StockwiseError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StockwiseError {
    fn from(err: toml::ser::Error) -> Self {
        StockwiseError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for StockwiseError {
    fn from(err: serde_json::Error) -> Self {
        StockwiseError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for StockWise operations.
pub type Result<T> = std::result::Result<T, StockwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockwiseError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = StockwiseError::Api("bind failed".to_string());
        assert_eq!(err.to_string(), "API error: bind failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StockwiseError = io_err.into();
        assert!(matches!(err, StockwiseError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parse_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: StockwiseError = parse_err.into();
        assert!(matches!(err, StockwiseError::Config(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: StockwiseError = json_err.into();
        assert!(matches!(err, StockwiseError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
