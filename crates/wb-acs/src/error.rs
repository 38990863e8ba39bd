//! Error types for wb-acs

use thiserror::Error;

/// wb-acs error type
#[derive(Error, Debug)]
pub enum AcsError {
    #[error("Invalid ACS connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("ACS API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse ACS response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AcsError {
    fn from(err: reqwest::Error) -> Self {
        AcsError::Http(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AcsError>;
