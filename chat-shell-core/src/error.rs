//! Error types for chat-shell

use thiserror::Error;

/// The main error type for chat-shell operations
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected user input (empty or whitespace-only utterance, empty key)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage read, write or remove failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A stored payload could not be decoded
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Response generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A specialized Result type for chat-shell operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether the error came from the storage layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence(_) | Error::Io(_))
    }
}
