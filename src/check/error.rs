// src/check/error.rs
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("Unexpected response: {0}")]
    Protocol(String),

    #[error("Check failed: {0}")]
    Rejected(String),

    #[error("Check cancelled")]
    Cancelled,
}

impl CheckError {
    /// Network failures and non-2xx responses, as opposed to a well-formed
    /// exchange whose payload was wrong or reported failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, CheckError::Transport(_) | CheckError::HttpStatus(_))
    }
}
