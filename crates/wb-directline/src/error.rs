//! Error types for wb-directline

use std::time::Duration;

use thiserror::Error;

/// wb-directline error type
#[derive(Error, Debug)]
pub enum DirectLineError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("DirectLine returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to parse DirectLine response: {0}")]
    Parse(String),

    #[error("DirectLine response carried no activity id")]
    MissingActivityId,

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Stream closed before the bot replied")]
    StreamClosed,

    #[error("No bot reply within {0:?}")]
    ReplyTimeout(Duration),
}

impl From<reqwest::Error> for DirectLineError {
    fn from(err: reqwest::Error) -> Self {
        DirectLineError::Http(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DirectLineError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        DirectLineError::WebSocket(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DirectLineError>;
