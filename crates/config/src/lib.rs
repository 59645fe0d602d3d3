//! Layered configuration for the market-data chat gateway.
//!
//! Supports loading configuration from an optional `config/default.toml`,
//! then environment variables (`MDGATE_` prefix), each field falling back to
//! the defaults documented in the project's external interface spec.

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, CacheConfig, RateLimitConfig, ServerConfig, Settings, SessionConfig,
    StoreBackend, StoreConfig, UpstreamConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
