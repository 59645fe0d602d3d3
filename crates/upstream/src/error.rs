use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to connect to upstream")]
    Connect,
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("{0}")]
    Rpc(String),
    #[error("upstream error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_connect() {
            UpstreamError::Connect
        } else {
            UpstreamError::Other(err.to_string())
        }
    }
}

impl From<UpstreamError> for mdgate_core::CoreError {
    fn from(err: UpstreamError) -> Self {
        mdgate_core::CoreError::Upstream(err.to_string())
    }
}
