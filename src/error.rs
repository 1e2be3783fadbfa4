use reqwest::StatusCode;
use thiserror::Error;

/// Shown for anything that is not a message from the API itself.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with `success: false`.
    #[error("rejected by server: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("response carried no data")]
    MissingData,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Text for the notification layer. Server-supplied messages win; a
    /// rejection without one falls back to `fallback`; everything else is
    /// reported as an unexpected error.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
            } if !message.is_empty() => message.clone(),
            ApiError::Rejected { .. } => fallback.to_string(),
            ApiError::File { path, .. } => format!("Could not read {path}"),
            _ => UNEXPECTED_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} is not a valid email")]
    InvalidEmail(&'static str),
    #[error("{0} must be a date (YYYY-MM-DD)")]
    InvalidDate(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
}
