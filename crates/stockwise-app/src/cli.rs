//! CLI argument definitions for the StockWise backend.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use stockwise_core::{EngineMode, StockwiseConfig};

/// StockWise - an investing tutor chatbot backend.
#[derive(Parser, Debug)]
#[command(name = "stockwise", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Response engine: `rules` or `generative`.
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<EngineMode>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > STOCKWISE_CONFIG env var > ~/.stockwise/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("STOCKWISE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Overwrite config values with any flags given on the command line.
    pub fn apply_overrides(&self, config: &mut StockwiseConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(mode) = self.mode {
            config.engine.mode = mode;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".stockwise").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".stockwise").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_flags() {
        let args = CliArgs::parse_from([
            "stockwise",
            "--config",
            "/tmp/sw.toml",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--mode",
            "generative",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/sw.toml")));
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.mode, Some(EngineMode::Generative));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_no_flags() {
        let args = CliArgs::parse_from(["stockwise"]);
        assert!(args.config.is_none());
        assert!(args.port.is_none());
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(CliArgs::try_parse_from(["stockwise", "--mode", "magic"]).is_err());
    }

    #[test]
    fn test_config_flag_wins() {
        let args = CliArgs::parse_from(["stockwise", "-c", "custom.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut config = StockwiseConfig::default();
        config.server.host = "10.0.0.1".to_string();

        let args = CliArgs::parse_from(["stockwise", "-p", "7000", "-m", "llm"]);
        args.apply_overrides(&mut config);

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.engine.mode, EngineMode::Generative);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_cli_beats_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 6000\n").unwrap();

        let mut config = StockwiseConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 6000);

        config.apply_env(|key| (key == "STOCKWISE_PORT").then(|| "6500".to_string()));
        assert_eq!(config.server.port, 6500);

        CliArgs::parse_from(["stockwise", "--port", "7000"]).apply_overrides(&mut config);
        assert_eq!(config.server.port, 7000);
    }
}
