//! Application settings.
//!
//! Sources, lowest priority first:
//! 1. Defaults (embedded in structs)
//! 2. TOML file (`downloader.toml`, or the path in `HTML_DOWNLOADER_CONFIG`)
//! 3. Environment variables, e.g. `HTML_DOWNLOADER__HTTP__VERIFY_TLS=false`

pub mod credentials;

use std::env;
use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::api::ClientConfig;

pub use credentials::CredentialStore;

const CONFIG_ENV_VAR: &str = "HTML_DOWNLOADER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "downloader.toml";
const ENV_PREFIX: &str = "HTML_DOWNLOADER";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `*.txt` holds `username,password`; anything else is read as INI.
    pub credentials_file: PathBuf,
    pub http: ClientConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("config.ini"),
            http: ClientConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::from_path(&self.credentials_file)
    }
}

pub fn load() -> Result<AppConfig, ConfigError> {
    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load settings from a specific file plus the environment.
pub fn load_from_sources(config_path: PathBuf) -> Result<AppConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "No configuration file at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
