//! Static echo generator: replies with a fixed template after a delay

use crate::base::{validate_utterance, GeneratorResult, ResponseGenerator};
use async_trait::async_trait;
use chat_shell_core::config::GeneratorConfig;
use chat_shell_core::session::{ChatUser, Message};
use std::time::Duration;
use tracing::debug;

/// Echoes the user's text back inside a fixed sentence.
///
/// Stands in for a real model backend: latency is simulated with a sleep and
/// the credential is accepted but not used.
#[derive(Debug, Clone)]
pub struct StaticEchoGenerator {
    delay: Duration,
    assistant: ChatUser,
}

impl StaticEchoGenerator {
    /// Create a generator with an explicit delay and assistant identity
    pub fn new(delay: Duration, assistant: ChatUser) -> Self {
        Self { delay, assistant }
    }

    /// Create a generator from configuration
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            Duration::from_millis(config.response_delay_ms),
            ChatUser::assistant(&config.assistant_name, config.assistant_avatar.clone()),
        )
    }

    /// The reply text for `user_text`
    pub fn reply_text(user_text: &str) -> String {
        format!(
            "You said: \"{}\". This is a static response from the chatbot.",
            user_text
        )
    }
}

impl Default for StaticEchoGenerator {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

#[async_trait]
impl ResponseGenerator for StaticEchoGenerator {
    /// Echo `user_text` after the configured delay.
    ///
    /// The credential is accepted but unused; a real backend would
    /// authenticate with it here.
    async fn generate(&self, user_text: &str, _credential: &str) -> GeneratorResult<Message> {
        validate_utterance(user_text)?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        debug!("Static reply produced after {:?}", self.delay);
        Ok(Message::new(
            Self::reply_text(user_text),
            self.assistant.clone(),
        ))
    }

    fn name(&self) -> &str {
        "static-echo"
    }
}
