//! Client Error Types

use thiserror::Error;

use crate::session::StoreError;

/// Errors that can occur when talking to the CRM backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No session token stored")]
    NoToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    /// HTTP status of the failed call, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
