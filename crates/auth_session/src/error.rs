use thiserror::Error;

/// Message recorded in the session when any operation is rejected.
pub const REJECTION_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("response did not contain a token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Status code of a rejected HTTP response, if this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AuthError::Status { code, .. } => Some(*code),
            AuthError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
