use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, StockwiseError};

/// Top-level configuration for the StockWise backend.
///
/// Loaded from `~/.stockwise/config.toml` by default. Every section falls back
/// to its defaults when absent, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockwiseConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl StockwiseConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StockwiseConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply environment overrides on top of the file values.
    ///
    /// `lookup` abstracts `std::env::var` so overrides can be tested without
    /// touching the process environment. Unparseable numeric values are
    /// ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OLLAMA_URL") {
            self.generation.endpoint = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.generation.model = model;
        }
        if let Some(raw) = lookup("OLLAMA_NUM_PREDICT") {
            match raw.parse::<u32>() {
                Ok(n) => self.generation.num_predict = n,
                Err(_) => warn!(value = %raw, "Ignoring invalid OLLAMA_NUM_PREDICT"),
            }
        }
        if let Some(raw) = lookup("OLLAMA_TEMPERATURE") {
            match raw.parse::<f32>() {
                Ok(t) => self.generation.temperature = t,
                Err(_) => warn!(value = %raw, "Ignoring invalid OLLAMA_TEMPERATURE"),
            }
        }
        if let Some(raw) = lookup("STOCKWISE_MODE") {
            match raw.parse::<EngineMode>() {
                Ok(mode) => self.engine.mode = mode,
                Err(e) => warn!(error = %e, "Ignoring invalid STOCKWISE_MODE"),
            }
        }
        if let Some(raw) = lookup("STOCKWISE_PORT") {
            match raw.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %raw, "Ignoring invalid STOCKWISE_PORT"),
            }
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let gen = &self.generation;
        if gen.num_predict == 0 {
            return Err(StockwiseError::Config(
                "generation.num_predict must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&gen.temperature) {
            return Err(StockwiseError::Config(format!(
                "generation.temperature must be within [0, 2], got {}",
                gen.temperature
            )));
        }
        if gen.connect_timeout_secs == 0 || gen.read_timeout_secs == 0 {
            return Err(StockwiseError::Config(
                "generation timeouts must be greater than 0".to_string(),
            ));
        }
        if gen.endpoint.trim().is_empty() {
            return Err(StockwiseError::Config(
                "generation.endpoint must not be empty".to_string(),
            ));
        }
        if gen.read_timeout_secs <= gen.connect_timeout_secs {
            return Err(StockwiseError::Config(format!(
                "generation.read_timeout_secs ({}) must be longer than connect_timeout_secs ({})",
                gen.read_timeout_secs, gen.connect_timeout_secs
            )));
        }
        // The caller deadline must not pre-empt the client's own read timeout.
        if self.engine.request_deadline_secs < gen.read_timeout_secs {
            return Err(StockwiseError::Config(format!(
                "engine.request_deadline_secs ({}) must be at least generation.read_timeout_secs ({})",
                self.engine.request_deadline_secs, gen.read_timeout_secs
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: Vec::new(),
        }
    }
}

/// Which response strategy the `/chat` endpoint is deployed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Keyword intent matching with canned replies and charts.
    #[default]
    Rules,
    /// Proxy to the external text-generation service.
    Generative,
}

impl EngineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Rules => "rules",
            EngineMode::Generative => "generative",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineMode {
    type Err = StockwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule" => Ok(EngineMode::Rules),
            "generative" | "llm" | "ollama" => Ok(EngineMode::Generative),
            other => Err(StockwiseError::Config(format!(
                "unknown engine mode '{}', expected 'rules' or 'generative'",
                other
            ))),
        }
    }
}

/// Response engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Strategy used for every request of this deployment.
    pub mode: EngineMode,
    /// Overall deadline for one generative request, in seconds.
    pub request_deadline_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::Rules,
            request_deadline_secs: 330,
        }
    }
}

/// External text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Full URL of the streaming generate endpoint.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Token budget per reply.
    pub num_predict: u32,
    /// Sampling temperature, within [0, 2].
    pub temperature: f32,
    /// Budget for establishing the connection.
    pub connect_timeout_secs: u64,
    /// Budget for the whole request including the streamed body.
    pub read_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:11434/api/generate".to_string(),
            model: "llama3".to_string(),
            num_predict: 256,
            temperature: 0.7,
            connect_timeout_secs: 10,
            read_timeout_secs: 300,
        }
    }
}
