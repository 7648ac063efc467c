//! Session controller: serializes sends, resets and credential changes
//! against the message log

use crate::transition::{TimedTransition, Transition};
use chat_shell_core::bus::{ChatEvent, EventBus};
use chat_shell_core::config::Config;
use chat_shell_core::credential::{CredentialPrompt, CredentialStore, PromptOutcome};
use chat_shell_core::session::{Message, Session, SessionStore};
use chat_shell_core::storage::KeyValueStore;
use chat_shell_core::utils::truncate;
use chat_shell_core::{Error, Result};
use chat_shell_providers::{ResponseGenerator, StaticEchoGenerator};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The controller's current operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in progress
    Idle,
    /// A send owns the log; further sends are dropped
    Sending,
    /// A new-chat transition is running
    Resetting,
}

/// Result of a [`SessionController::send`] call
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Both messages were appended
    Replied { user: Message, reply: Message },
    /// A new chat started while the reply was pending; the exchange was
    /// dropped so the old log is not resurrected
    Discarded,
    /// Another operation was in progress; nothing happened
    Dropped,
}

/// Result of a [`SessionController::new_chat`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The session was cleared and both transition phases played
    Completed,
    /// A reset was already running; nothing happened
    Dropped,
}

/// What the rendering layer needs to draw the chat
#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub session: Session,
    pub phase: Phase,
    pub has_credential: bool,
}

impl ControllerSnapshot {
    /// Whether the input box should accept text
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Whether to show the typing indicator
    pub fn is_typing(&self) -> bool {
        self.phase == Phase::Sending
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    session: Session,
    sending: bool,
    resetting: bool,
    credential: String,
    /// Bumped on every successful reset
    epoch: u64,
}

impl ControllerState {
    fn phase(&self) -> Phase {
        if self.resetting {
            Phase::Resetting
        } else if self.sending {
            Phase::Sending
        } else {
            Phase::Idle
        }
    }
}

#[derive(Clone, Copy)]
enum Flag {
    Sending,
    Resetting,
}

/// Lowers an operation flag when the operation ends, including when its
/// future is dropped mid-flight.
struct FlagGuard<'a> {
    state: &'a Mutex<ControllerState>,
    flag: Flag,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        match self.flag {
            Flag::Sending => state.sending = false,
            Flag::Resetting => state.resetting = false,
        }
    }
}

/// Owns the in-memory session and coordinates every operation on it.
///
/// Only one send runs at a time and only one reset runs at a time; a
/// request arriving while its slot is taken is dropped, not queued. Each
/// mutation is persisted under `persist_lock`, so stored snapshots follow
/// the order mutations were applied in.
pub struct SessionController {
    state: Mutex<ControllerState>,
    persist_lock: tokio::sync::Mutex<()>,
    store: SessionStore,
    credentials: CredentialStore,
    generator: Arc<dyn ResponseGenerator>,
    transition: Arc<dyn Transition>,
    events: EventBus,
}

impl SessionController {
    /// Create a controller with an empty session and no credential
    pub fn new(
        store: SessionStore,
        credentials: CredentialStore,
        generator: Arc<dyn ResponseGenerator>,
        transition: Arc<dyn Transition>,
    ) -> Self {
        Self {
            state: Mutex::new(ControllerState::default()),
            persist_lock: tokio::sync::Mutex::new(()),
            store,
            credentials,
            generator,
            transition,
            events: EventBus::new(),
        }
    }

    /// Wire the controller from configuration over the given storage
    pub fn from_config(config: &Config, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            SessionStore::with_key(storage.clone(), &config.storage.history_key),
            CredentialStore::with_key(storage, &config.storage.credential_key),
            Arc::new(StaticEchoGenerator::from_config(&config.generator)),
            Arc::new(TimedTransition::from_config(&config.transition)),
        )
    }

    /// Publish events on an existing bus instead of a private one
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// The bus events are published on
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    /// Whether the input box should accept text
    pub fn input_enabled(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Copy of the current session
    pub fn session(&self) -> Session {
        self.state.lock().session.clone()
    }

    /// Everything the rendering layer needs, read atomically
    pub fn state(&self) -> ControllerSnapshot {
        let state = self.state.lock();
        ControllerSnapshot {
            session: state.session.clone(),
            phase: state.phase(),
            has_credential: !state.credential.is_empty(),
        }
    }

    /// Replace the in-memory session and credential with the stored ones.
    ///
    /// Meant to run once at startup. Failures are logged and leave an empty
    /// session or no credential; a malformed stored value is left untouched
    /// for inspection. Returns the number of messages restored.
    pub async fn restore(&self) -> usize {
        let _persist = self.persist_lock.lock().await;
        let session = match self.store.load().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to load messages, starting empty: {}", e);
                Session::new()
            }
        };
        let credential = match self.credentials.load().await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                error!("Failed to load API key: {}", e);
                String::new()
            }
        };

        let count = session.len();
        {
            let mut state = self.state.lock();
            state.session = session;
            state.credential = credential;
        }
        info!("Restored {} messages", count);
        count
    }

    /// Send a user message and wait for the reply.
    ///
    /// Dropped without effect while another send or a reset is running.
    /// Blank text is rejected before anything is appended. The user message
    /// is appended and persisted before the generator is called; on
    /// generation failure it stays in the log and an error notice is
    /// published.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let (credential, epoch) = {
            let mut state = self.state.lock();
            if state.sending || state.resetting {
                debug!("Send requested while {:?}, dropping", state.phase());
                return Ok(SendOutcome::Dropped);
            }
            if text.trim().is_empty() {
                return Err(Error::InvalidInput("message must not be empty".to_string()));
            }
            state.sending = true;
            (state.credential.clone(), state.epoch)
        };
        let _sending = FlagGuard {
            state: &self.state,
            flag: Flag::Sending,
        };

        info!(
            "Sending message via {}: {}",
            self.generator.name(),
            truncate(text, 80)
        );

        let user = Message::from_user(text);
        if !self.append_and_persist(user.clone(), epoch).await {
            return Ok(SendOutcome::Discarded);
        }

        self.events.publish(ChatEvent::TypingStarted);
        let result = self.generator.generate(text, &credential).await;
        self.events.publish(ChatEvent::TypingStopped);

        match result {
            Ok(reply) => {
                if self.append_and_persist(reply.clone(), epoch).await {
                    Ok(SendOutcome::Replied { user, reply })
                } else {
                    info!("Session was reset while the reply was pending, discarding it");
                    Ok(SendOutcome::Discarded)
                }
            }
            Err(e) => {
                error!("Error handling AI response: {}", e);
                self.events.publish(ChatEvent::generation_failed());
                Err(e.into())
            }
        }
    }

    /// Start a new chat: exit transition, clear, entry transition.
    ///
    /// Dropped while another reset is running. If storage cannot be
    /// cleared the in-memory session is kept, the entry transition still
    /// plays, and the persistence error is returned.
    pub async fn new_chat(&self) -> Result<ResetOutcome> {
        {
            let mut state = self.state.lock();
            if state.resetting {
                debug!("New chat already in progress, dropping request");
                return Ok(ResetOutcome::Dropped);
            }
            state.resetting = true;
        }
        let resetting = FlagGuard {
            state: &self.state,
            flag: Flag::Resetting,
        };

        self.events.publish(ChatEvent::ResetStarted);
        self.transition.exit().await;
        let cleared = self.clear_session().await;
        self.transition.enter().await;

        drop(resetting);
        self.events.publish(ChatEvent::ResetFinished);

        cleared.map(|()| ResetOutcome::Completed)
    }

    /// Open the API key prompt, pre-filled from storage
    pub async fn open_credential_prompt(&self) -> CredentialPrompt {
        CredentialPrompt::open(self.credentials.clone()).await
    }

    /// Adopt the key a closed prompt saved; a cancelled prompt changes nothing
    pub fn apply_prompt_outcome(&self, outcome: &PromptOutcome) {
        if let Some(value) = outcome.value() {
            self.state.lock().credential = value.to_string();
            info!("API key updated");
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.state.lock().credential.is_empty()
    }

    /// Append `message` if no reset happened since `epoch`, then persist the
    /// new snapshot. Returns whether the message was appended.
    ///
    /// A failed write is logged and announced; the in-memory session stays
    /// authoritative.
    async fn append_and_persist(&self, message: Message, epoch: u64) -> bool {
        let _persist = self.persist_lock.lock().await;
        let snapshot = {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                return false;
            }
            state.session.push(message.clone());
            state.session.clone()
        };

        self.events.publish(ChatEvent::MessageAppended { message });
        if let Err(e) = self.store.save(&snapshot).await {
            warn!("Session kept in memory only: {}", e);
            self.events.publish(ChatEvent::PersistenceFailed {
                reason: e.to_string(),
            });
        }
        true
    }

    async fn clear_session(&self) -> Result<()> {
        let _persist = self.persist_lock.lock().await;
        match self.store.clear().await {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    state.session = Session::new();
                    state.epoch += 1;
                }
                self.events.publish(ChatEvent::SessionCleared);
                info!("New chat initiated: chat history cleared");
                Ok(())
            }
            Err(e) => {
                error!("Failed to initiate new chat: {}", e);
                self.events.publish(ChatEvent::reset_failed());
                Err(e)
            }
        }
    }
}
