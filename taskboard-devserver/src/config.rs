//! Configuration for the development server.
//!
//! Priority (highest first): CLI arguments, environment variables (via
//! clap `env`), TOML file (`~/.config/taskboard-devserver/config.toml`),
//! compiled defaults.

use std::path::PathBuf;

use crate::store::Seed;

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
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    seed: SeedFileConfig,
}

/// `[server]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    bind_addr: Option<String>,
}

/// `[seed]` section: catalog names to start with.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SeedFileConfig {
    types: Option<Vec<String>>,
    companies: Option<Vec<String>>,
    users: Option<Vec<String>>,
}

/// CLI arguments for the development server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "In-memory Taskboard backend for development")]
pub struct ServerCliArgs {
    /// Address to bind to.
    #[arg(short, long, env = "TASKBOARD_DEV_ADDR")]
    pub bind: Option<String>,

    /// Path to config file (default: `~/.config/taskboard-devserver/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_DEV_LOG")]
    pub log_level: String,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: String,
    /// Log level filter string.
    pub log_level: String,
    /// Initial catalog.
    pub seed: Seed,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            seed: Seed::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from CLI args, env vars and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit config file cannot be read,
    /// or any config file cannot be parsed.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    fn resolve(cli: &ServerCliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: cli
                .bind
                .clone()
                .or_else(|| file.server.bind_addr.clone())
                .unwrap_or(defaults.bind_addr),
            log_level: cli.log_level.clone(),
            seed: Seed {
                types: file.seed.types.clone().unwrap_or(defaults.seed.types),
                companies: file
                    .seed
                    .companies
                    .clone()
                    .unwrap_or(defaults.seed.companies),
                users: file.seed.users.clone().unwrap_or(defaults.seed.users),
            },
        }
    }
}

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
        config_dir.join("taskboard-devserver").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
