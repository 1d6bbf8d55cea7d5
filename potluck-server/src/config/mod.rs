//! Configuration module for potluck-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{FileConfig, StorageBackend, StorageConfig};
use potluck_core::hub::HubConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration after overrides and validation.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub hub: HubConfig,
    pub storage: StorageConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    memory_override: bool,
}

impl ConfigLoader {
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        memory_override: bool,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            memory_override,
        }
    }

    /// Read the TOML file, apply CLI overrides and validate.
    ///
    /// A missing file is not an error; every section has defaults.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if self.memory_override {
            file_config.storage.backend = StorageBackend::Memory;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            hub: HubConfig {
                client_queue_capacity: file_config.hub.client_queue_capacity,
            },
            storage: file_config.storage,
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.hub.client_queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "hub.client_queue_capacity must be greater than zero".to_string(),
        ));
    }
    if config.storage.backend == StorageBackend::Postgres && config.storage.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_connections must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
