//! HTTP client for the upstream market-data MCP tool server.
//!
//! Wraps the JSON-RPC 2.0 `tools/call` / `tools/list` surface, normalizes the
//! several response shapes that surface revision drift produces, and exposes
//! a typed method per tool so the gateway never touches a raw envelope.

pub mod alias;
pub mod client;
pub mod error;
pub mod rpc;

pub use client::{HttpUpstreamClient, UpstreamClient};
pub use error::UpstreamError;

/// Timeout for the separate `/health` probe, independent of the configured
/// per-request upstream timeout.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
