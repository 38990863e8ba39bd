//! Error types for wb-whatsapp

use thiserror::Error;

/// wb-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Missing field '{field}' in {event_type} event")]
    MissingField {
        event_type: &'static str,
        field: &'static str,
    },

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("DirectLine error: {0}")]
    DirectLine(#[from] wb_directline::DirectLineError),

    #[error("ACS error: {0}")]
    Acs(#[from] wb_acs::AcsError),
}

impl From<wb_core::Error> for WhatsAppError {
    fn from(err: wb_core::Error) -> Self {
        WhatsAppError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
