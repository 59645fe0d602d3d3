//! Main settings module.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level application settings, deserialized from an optional
/// `config/default.toml` and then overlaid with `MDGATE_`-prefixed
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_session()?;
        self.validate_rate_limit()?;
        self.validate_cache()?;
        self.validate_upstream()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "port cannot be 0".to_string(),
            });
        }
        if self.server.max_query_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_query_length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.timeout_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.timeout_minutes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session.cleanup_interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.cleanup_interval_minutes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_rate_limit(&self) -> Result<(), ConfigError> {
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.requests".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.window_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_price_seconds == 0 || self.cache.ttl_historical_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache".to_string(),
                message: "TTLs must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    fn validate_upstream(&self) -> Result<(), ConfigError> {
        if self.upstream.url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "upstream.url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.timeout_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_true() -> bool {
    true
}
fn default_max_query_length() -> usize {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            max_query_length: default_max_query_length(),
        }
    }
}

/// Which persistent store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Embedded,
    Scylla,
}

/// Persistent store configuration (sessions + cache rows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,
    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var("SCYLLA_HOSTS")
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var("SCYLLA_KEYSPACE").unwrap_or_else(|_| "mdgate".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Session timeout and janitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_timeout_minutes")]
    pub timeout_minutes: u64,
    #[serde(default = "default_session_cleanup_interval_minutes")]
    pub cleanup_interval_minutes: u64,
}

fn default_session_timeout_minutes() -> u64 {
    60
}
fn default_session_cleanup_interval_minutes() -> u64 {
    15
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: default_session_timeout_minutes(),
            cleanup_interval_minutes: default_session_cleanup_interval_minutes(),
        }
    }
}

/// Sliding-window rate limit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_requests")]
    pub requests: u32,
    #[serde(default = "default_rate_limit_window_seconds")]
    pub window_seconds: u64,
}

fn default_rate_limit_requests() -> u32 {
    30
}
fn default_rate_limit_window_seconds() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: default_rate_limit_requests(),
            window_seconds: default_rate_limit_window_seconds(),
        }
    }
}

/// Cache TTL configuration, per query type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_price")]
    pub ttl_price_seconds: u64,
    #[serde(default = "default_cache_ttl_historical")]
    pub ttl_historical_seconds: u64,
    #[serde(default = "default_cache_ttl_indicator")]
    pub ttl_indicator_seconds: u64,
    #[serde(default = "default_cache_cleanup_interval_minutes")]
    pub cleanup_interval_minutes: u64,
}

fn default_cache_ttl_price() -> u64 {
    45
}
fn default_cache_ttl_historical() -> u64 {
    300
}
fn default_cache_ttl_indicator() -> u64 {
    300
}
fn default_cache_cleanup_interval_minutes() -> u64 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_price_seconds: default_cache_ttl_price(),
            ttl_historical_seconds: default_cache_ttl_historical(),
            ttl_indicator_seconds: default_cache_ttl_indicator(),
            cleanup_interval_minutes: default_cache_cleanup_interval_minutes(),
        }
    }
}

/// Upstream JSON-RPC tool server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub url: String,
    #[serde(default = "default_upstream_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_upstream_url() -> String {
    crate::constants::endpoints::UPSTREAM_DEFAULT.to_string()
}
fn default_upstream_timeout_seconds() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_seconds: default_upstream_timeout_seconds(),
        }
    }
}

/// Load settings from an optional `config/default.toml` overlaid with
/// `MDGATE_`-prefixed environment variables (double underscore as the
/// nesting separator, e.g. `MDGATE_RATE_LIMIT__REQUESTS=60`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("MDGATE")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.session.timeout_minutes, 60);
        assert_eq!(settings.rate_limit.requests, 30);
        assert_eq!(settings.rate_limit.window_seconds, 60);
        assert_eq!(settings.cache.ttl_price_seconds, 45);
        assert_eq!(settings.cache.ttl_historical_seconds, 300);
        assert_eq!(settings.server.max_query_length, 5000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_rate_limit_window_is_rejected() {
        let mut settings = Settings::default();
        settings.rate_limit.window_seconds = 0;
        assert!(settings.validate().is_err());
    }
}
