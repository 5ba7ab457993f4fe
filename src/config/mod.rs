//! Configuration management for AttachBox
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use attachbox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Webhook endpoint: {:?}", config.webhook.endpoint);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ATTACHBOX__<section>__<key>`
//!
//! Examples:
//! - `ATTACHBOX__STORAGE__BUCKET=mail-attachments`
//! - `ATTACHBOX__WEBHOOK__ENDPOINT=https://hooks.example.com/incoming`
//! - `ATTACHBOX__LINKS__TTL_SECS=600`
//!
//! Secrets (`WEBHOOK_API_KEY` / `API_KEY`, S3 credentials) are loaded from
//! plain environment variables and never from TOML.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/attachbox.toml`.
//! This can be overridden using the `ATTACHBOX_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use models::{
    Config, FilterConfig, LinkConfig, ServerConfig, StorageConfig, StorageProvider, WebhookConfig,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`ATTACHBOX__*`)
    /// 2. TOML file (default: `config/attachbox.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (missing bucket or webhook endpoint, zero TTL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
