//! Yandex Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YandexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Operation {id} failed with code {code}: {message}")]
    OperationFailed {
        id: String,
        code: i32,
        message: String,
    },

    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<YandexError> for tfboot_cloud::CloudError {
    fn from(err: YandexError) -> Self {
        use tfboot_cloud::CloudError;

        match err {
            YandexError::ApiError { status: 401, message } => {
                CloudError::AuthenticationFailed(message)
            }
            YandexError::ApiError { status, message } => CloudError::Api { status, message },
            YandexError::OperationFailed { id, code, message } => CloudError::OperationFailed {
                id,
                message: format!("code {}: {}", code, message),
            },
            YandexError::InvalidResponse(message) => CloudError::InvalidResponse(message),
            YandexError::JsonError(e) => CloudError::InvalidResponse(e.to_string()),
            YandexError::Http(e) if e.is_decode() => CloudError::InvalidResponse(e.to_string()),
            YandexError::Http(e) => CloudError::Transport(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, YandexError>;
