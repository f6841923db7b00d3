//! Backend API error types

use std::time::Duration;
use thiserror::Error;

/// Errors from talking to the backend - the client's "network error" family
///
/// Every variant is surfaced to the user as a retryable or final notice; none
/// of them is fatal to the session.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a 404 from the backend
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            ApiError::Network(_) => true,
            ApiError::Timeout(_) => true,
            ApiError::Unavailable(_) => true,
            ApiError::InvalidResponse(_) => false,
            ApiError::Json(_) => false,
        }
    }
}
