//! Centralized constants for the market-data chat gateway.
//!
//! This module holds only generic infrastructure defaults (service
//! endpoints, timeouts). Business-relevant tuning (TTLs, rate limits,
//! session windows) lives on [`crate::Settings`] so it is overridable
//! per deployment; these constants are the ones nothing should ever need
//! to override.

/// Service endpoints (env-var backed, with a hard-coded fallback).
pub mod endpoints {
    use once_cell::sync::Lazy;

    /// Upstream market-data tool server (env: `UPSTREAM_URL`).
    pub static UPSTREAM_DEFAULT: Lazy<String> =
        Lazy::new(|| std::env::var("UPSTREAM_URL").unwrap_or_else(|_| "http://localhost:3847".to_string()));
}

/// Timeouts, in milliseconds unless noted.
pub mod timeouts {
    /// Upper bound placed on a single upstream `tools/call` regardless of
    /// configured timeout, to keep a misconfigured deployment from hanging
    /// request handlers indefinitely.
    pub const UPSTREAM_HARD_CAP_SECS: u64 = 120;

    /// Timeout for the lightweight `/health` probe against the upstream.
    pub const UPSTREAM_HEALTH_CHECK_SECS: u64 = 5;
}
