//! # Application Configuration
//!
//! Loads `AppConfig` from `config.yml` layered with environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use formscout::ScannerConfig;
use formscout_web::GatewayConfig;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::sync::LazyLock;
use tracing::info;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap());

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Interface to bind. Defaults to every interface.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline and personal-data scan settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Proxy list, per-attempt timeout and body plausibility thresholds.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

impl AppConfig {
    /// The socket address the server binds, from `bind_host` and `port`.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = if self.bind_host.is_empty() {
            default_bind_host()
        } else {
            self.bind_host.clone()
        };
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::General(format!("invalid host address: {host}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded = ENV_VAR_RE.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the application configuration.
///
/// Layers, lowest priority first:
/// - built-in defaults,
/// - the YAML file (`config_path_override`, or `config.yml` next to the crate),
/// - top-level environment variables such as `PORT`,
/// - `FORMSCOUT_`-prefixed variables with `__` for nesting
///   (e.g. `FORMSCOUT_GATEWAY__ATTEMPT_TIMEOUT_MS`).
///
/// An explicit override path that does not exist is an error; a missing
/// default file is not.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };

    match read_and_substitute(&config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => info!("'{config_path}' not found; using built-in defaults."),
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("FORMSCOUT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
