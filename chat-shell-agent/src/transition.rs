//! Two-phase visual transition played around a new-chat reset

use async_trait::async_trait;
use chat_shell_core::config::TransitionConfig;
use std::time::Duration;

/// The exit and entry phases of a new-chat transition.
///
/// The controller awaits `exit` before clearing the session and `enter`
/// after it, so the old messages are never visible while the new chat
/// appears.
#[async_trait]
pub trait Transition: Send + Sync {
    /// Hide the current conversation; resolves when fully hidden
    async fn exit(&self);

    /// Reveal the (now empty) conversation; resolves when fully shown
    async fn enter(&self);
}

/// Waits fixed durations, mirroring fade-and-slide animations
#[derive(Debug, Clone)]
pub struct TimedTransition {
    exit: Duration,
    entry: Duration,
}

impl TimedTransition {
    pub fn new(exit: Duration, entry: Duration) -> Self {
        Self { exit, entry }
    }

    pub fn from_config(config: &TransitionConfig) -> Self {
        Self::new(
            Duration::from_millis(config.exit_ms),
            Duration::from_millis(config.entry_ms),
        )
    }
}

impl Default for TimedTransition {
    fn default() -> Self {
        Self::from_config(&TransitionConfig::default())
    }
}

#[async_trait]
impl Transition for TimedTransition {
    async fn exit(&self) {
        tokio::time::sleep(self.exit).await;
    }

    async fn enter(&self) {
        tokio::time::sleep(self.entry).await;
    }
}

/// Completes both phases immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransition;

#[async_trait]
impl Transition for InstantTransition {
    async fn exit(&self) {}

    async fn enter(&self) {}
}
