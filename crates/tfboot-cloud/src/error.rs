//! Cloud provider error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised at the remote API boundary
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Operation {id} failed: {message}")]
    OperationFailed { id: String, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

impl CloudError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloudError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
