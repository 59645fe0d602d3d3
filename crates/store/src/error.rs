use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for mdgate_core::CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => mdgate_core::CoreError::SessionNotFound,
            StoreError::Backend(msg) => mdgate_core::CoreError::Store(msg),
        }
    }
}
