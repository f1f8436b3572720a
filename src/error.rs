use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode session history: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode session history: {0}")]
    Decode(#[source] serde_json::Error),
}
