//! Error types for wb-core

use thiserror::Error;

/// Main error type for wb-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for wb-core
pub type Result<T> = std::result::Result<T, Error>;
