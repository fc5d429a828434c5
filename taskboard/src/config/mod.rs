//! Configuration system for the `taskboard` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::sync::DEFAULT_WINDOW;
use crate::tasks::BoardKind;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The `[ui] view` value is not a known board.
    #[error("invalid board view in config file: {0}")]
    InvalidView(String),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    sync: SyncFileConfig,
    ui: UiFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    debounce_ms: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    view: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Quiet window for inline edits.
    pub debounce: Duration,
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Board shown at startup.
    pub view: BoardKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            debounce: DEFAULT_WINDOW,
            poll_timeout: Duration::from_millis(50),
            view: BoardKind::Today,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// any config file cannot be parsed, or its `view` is unknown.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let file_view = file
            .ui
            .view
            .as_deref()
            .map(str::parse::<BoardKind>)
            .transpose()
            .map_err(ConfigError::InvalidView)?;

        Ok(Self {
            base_url: cli
                .base_url
                .clone()
                .or_else(|| file.server.base_url.clone())
                .unwrap_or(defaults.base_url),
            request_timeout: file
                .server
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            debounce: file
                .sync
                .debounce_ms
                .map_or(defaults.debounce, Duration::from_millis),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            view: cli.view.or(file_view).unwrap_or(defaults.view),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task board")]
pub struct CliArgs {
    /// Base URL of the task backend.
    #[arg(long, env = "TASKBOARD_URL")]
    pub base_url: Option<String>,

    /// Board to open: today, review or all.
    #[arg(long)]
    pub view: Option<BoardKind>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.debounce, Duration::from_millis(1000));
        assert_eq!(config.poll_timeout, Duration::from_millis(50));
        assert_eq!(config.view, BoardKind::Today);
    }

    #[test]
    fn toml_parsing_full() {
        let toml_str = r#"
[server]
base_url = "http://tasks.internal:9000/backend"
request_timeout_ms = 2500

[sync]
debounce_ms = 400

[ui]
poll_timeout_ms = 100
view = "review"
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file).unwrap();

        assert_eq!(config.base_url, "http://tasks.internal:9000/backend");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.debounce, Duration::from_millis(400));
        assert_eq!(config.poll_timeout, Duration::from_millis(100));
        assert_eq!(config.view, BoardKind::InReview);
    }

    #[test]
    fn toml_parsing_empty() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file).unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
        assert_eq!(config.debounce, DEFAULT_WINDOW);
    }

    #[test]
    fn cli_overrides_file() {
        let toml_str = r#"
[server]
base_url = "http://file:8080"

[ui]
view = "all"
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let cli = CliArgs {
            base_url: Some("http://cli:8080".to_string()),
            view: Some(BoardKind::Today),
            ..Default::default()
        };
        let config = ClientConfig::resolve(&cli, &file).unwrap();
        assert_eq!(config.base_url, "http://cli:8080");
        assert_eq!(config.view, BoardKind::Today);
    }

    #[test]
    fn unknown_view_in_file_is_an_error() {
        let file: ConfigFile = toml::from_str("[ui]\nview = \"weekly\"\n").unwrap();
        let err = ClientConfig::resolve(&CliArgs::default(), &file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidView(_)));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        assert!(load_config_file(None).is_ok());
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(std::path::Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
