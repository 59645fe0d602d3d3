//! Shared error taxonomy returned to callers as an [`ErrorEnvelope`].

use serde::{Deserialize, Serialize};

/// Machine-readable error codes surfaced on [`ErrorEnvelope`].
///
/// These are the only codes the orchestrator emits; lower layers map their
/// own errors onto this set rather than leaking implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SessionNotFound,
    SessionExpired,
    RateLimited,
    NoSymbol,
    NoIndicator,
    MissingCurrencies,
    McpError,
    ProcessingError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::NoSymbol => "NO_SYMBOL",
            ErrorCode::NoIndicator => "NO_INDICATOR",
            ErrorCode::MissingCurrencies => "MISSING_CURRENCIES",
            ErrorCode::McpError => "MCP_ERROR",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Detail payload nested under `ErrorEnvelope.error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_made: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_limit: Option<u32>,
}

impl ErrorDetail {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry_after_seconds: None,
            requests_made: None,
            requests_limit: None,
        }
    }

    pub fn rate_limited(retry_after_seconds: u64, requests_made: u32, requests_limit: u32) -> Self {
        Self {
            code: ErrorCode::RateLimited,
            message: format!(
                "rate limit exceeded: {requests_made}/{requests_limit} requests, retry in {retry_after_seconds}s"
            ),
            retry_after_seconds: Some(retry_after_seconds),
            requests_made: Some(requests_made),
            requests_limit: Some(requests_limit),
        }
    }
}

/// The user-facing envelope returned whenever `process_chat` cannot produce a
/// [`crate::types::ChatResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub answer: String,
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_data: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub fn new(answer: impl Into<String>, detail: ErrorDetail) -> Self {
        Self {
            answer: answer.into(),
            error: detail,
            cached_data: None,
        }
    }
}

/// Crate-local error type shared by the store, cache, interpreter and
/// upstream layers before they are folded into a gateway-level
/// [`ErrorEnvelope`] by `mdgate-gateway`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("rate limit exceeded, retry in {retry_after_seconds}s")]
    RateLimited {
        retry_after_seconds: u64,
        requests_made: u32,
        requests_limit: u32,
    },
    #[error("no symbol could be resolved from the query")]
    NoSymbol,
    #[error("no indicator named in the query")]
    NoIndicator,
    #[error("both source and target currency are required")]
    MissingCurrencies,
    #[error("store error: {0}")]
    Store(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("failed to process query: {0}")]
    Processing(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<CoreError> for ErrorEnvelope {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionNotFound => ErrorEnvelope::new(
                "I couldn't find that session. Please start a new conversation.",
                ErrorDetail::new(ErrorCode::SessionNotFound, "session not found"),
            ),
            CoreError::SessionExpired => ErrorEnvelope::new(
                "Your session has expired. Please start a new conversation.",
                ErrorDetail::new(ErrorCode::SessionExpired, "session expired"),
            ),
            CoreError::RateLimited {
                retry_after_seconds,
                requests_made,
                requests_limit,
            } => ErrorEnvelope::new(
                format!(
                    "You're sending requests too quickly. Please wait {retry_after_seconds}s and try again."
                ),
                ErrorDetail::rate_limited(retry_after_seconds, requests_made, requests_limit),
            ),
            CoreError::NoSymbol => ErrorEnvelope::new(
                "I couldn't figure out which symbol you're asking about.",
                ErrorDetail::new(ErrorCode::NoSymbol, "no symbol resolved"),
            ),
            CoreError::NoIndicator => ErrorEnvelope::new(
                "I couldn't figure out which indicator you're asking about.",
                ErrorDetail::new(ErrorCode::NoIndicator, "no indicator resolved"),
            ),
            CoreError::MissingCurrencies => ErrorEnvelope::new(
                "I need both a source and a target currency to convert.",
                ErrorDetail::new(ErrorCode::MissingCurrencies, "missing source or target currency"),
            ),
            CoreError::Store(msg) => ErrorEnvelope::new(
                "Something went wrong on our end. Please try again shortly.",
                ErrorDetail::new(ErrorCode::InternalError, msg),
            ),
            CoreError::Upstream(msg) => ErrorEnvelope::new(
                "I couldn't reach the market data provider right now.",
                ErrorDetail::new(ErrorCode::McpError, msg),
            ),
            CoreError::Processing(msg) => ErrorEnvelope::new(
                "Something went wrong while processing your request.",
                ErrorDetail::new(ErrorCode::ProcessingError, msg),
            ),
            CoreError::Internal(msg) => ErrorEnvelope::new(
                "Something went wrong on our end. Please try again shortly.",
                ErrorDetail::new(ErrorCode::InternalError, msg),
            ),
        }
    }
}
