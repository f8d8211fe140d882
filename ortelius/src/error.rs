//! Error types used by the crate.

use thiserror::Error;

/// Ortelius error type.
#[derive(Debug, Error)]
pub enum OrteliusError {
    /// Network failure or request timeout.
    #[error("failed to reach remote service")]
    Io,
    /// Remote service responded with a non-success status.
    #[error("remote service returned status {status}")]
    Backend {
        /// HTTP status code of the response.
        status: u16,
    },
    /// Response body could not be decoded.
    #[error("failed to decode response")]
    Decoding(#[from] serde_json::Error),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for OrteliusError {
    fn from(_value: reqwest::Error) -> Self {
        Self::Io
    }
}
