//! Base trait for response generators

use async_trait::async_trait;
use chat_shell_core::session::Message;
use thiserror::Error;

/// Error type for generator operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The utterance was empty or whitespace-only; raised before any delay
    #[error("Invalid message: {0}")]
    InvalidInput(String),

    /// The backend could not produce a reply
    #[error("Generation failed: {0}")]
    Failed(String),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

impl From<GeneratorError> for chat_shell_core::Error {
    fn from(e: GeneratorError) -> Self {
        chat_shell_core::Error::Generation(e.to_string())
    }
}

/// Check the precondition every generator shares: a non-blank utterance
pub fn validate_utterance(user_text: &str) -> GeneratorResult<()> {
    if user_text.trim().is_empty() {
        return Err(GeneratorError::InvalidInput(
            "message must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Produces exactly one assistant message for one user utterance
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate a reply to `user_text`.
    ///
    /// `credential` is the stored API key (possibly empty). No retries are
    /// performed; the caller owns retry policy.
    async fn generate(&self, user_text: &str, credential: &str) -> GeneratorResult<Message>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_utterance() {
        assert!(validate_utterance("hello").is_ok());
        assert!(matches!(
            validate_utterance(""),
            Err(GeneratorError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_utterance(" \n\t"),
            Err(GeneratorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_converts_to_core_generation_error() {
        let err: chat_shell_core::Error = GeneratorError::Failed("boom".to_string()).into();
        assert!(matches!(err, chat_shell_core::Error::Generation(_)));
        assert!(err.to_string().contains("boom"));
    }
}
