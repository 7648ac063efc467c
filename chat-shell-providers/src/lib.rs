//! Response generators for chat-shell
//!
//! This crate provides the generator seam and the static echo generator
//! used until a real model backend is plugged in.

pub mod base;
pub mod static_echo;

pub use base::{validate_utterance, GeneratorError, GeneratorResult, ResponseGenerator};
pub use static_echo::StaticEchoGenerator;

use async_trait::async_trait;
use chat_shell_core::session::Message;
use std::sync::{Arc, RwLock};

/// A generator that allows hot-swapping the underlying implementation
pub struct DynamicGenerator {
    inner: RwLock<Arc<dyn ResponseGenerator>>,
}

impl DynamicGenerator {
    /// Create a new dynamic generator
    pub fn new(initial: Arc<dyn ResponseGenerator>) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Update the underlying generator
    pub fn update(&self, new_generator: Arc<dyn ResponseGenerator>) {
        let mut lock = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *lock = new_generator;
    }

    /// Get the current generator
    pub fn current(&self) -> Arc<dyn ResponseGenerator> {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl ResponseGenerator for DynamicGenerator {
    async fn generate(&self, user_text: &str, credential: &str) -> GeneratorResult<Message> {
        // Clone out of the lock so a swap never waits on a pending reply.
        let generator = self.current();
        generator.generate(user_text, credential).await
    }

    fn name(&self) -> &str {
        "dynamic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_shell_core::session::ChatUser;
    use std::time::Duration;

    struct Fixed(&'static str);

    #[async_trait]
    impl ResponseGenerator for Fixed {
        async fn generate(&self, user_text: &str, _credential: &str) -> GeneratorResult<Message> {
            validate_utterance(user_text)?;
            Ok(Message::new(self.0, ChatUser::assistant("Fixed", None)))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_dynamic_generator_swaps() {
        let generator = DynamicGenerator::new(Arc::new(StaticEchoGenerator::new(
            Duration::ZERO,
            ChatUser::assistant("Chatbot", None),
        )));
        assert_eq!(generator.current().name(), "static-echo");

        let reply = generator.generate("hi", "").await.unwrap();
        assert!(reply.text.starts_with("You said: \"hi\""));

        generator.update(Arc::new(Fixed("swapped")));
        assert_eq!(generator.current().name(), "fixed");

        let reply = generator.generate("hi", "").await.unwrap();
        assert_eq!(reply.text, "swapped");
    }
}
