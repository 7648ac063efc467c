//! Event types for the event bus

use crate::session::Message;
use serde::{Deserialize, Serialize};

/// Something the rendering layer should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the session
    MessageAppended { message: Message },
    /// A reply is being generated; show the typing indicator
    TypingStarted,
    /// Reply generation ended, successfully or not
    TypingStopped,
    /// A dismissable notice for the end user
    ErrorNotice { title: String, message: String },
    /// Writing the session to storage failed; the in-memory log is unchanged
    PersistenceFailed { reason: String },
    /// The exit phase of a new-chat transition started
    ResetStarted,
    /// The session was emptied
    SessionCleared,
    /// The entry phase of a new-chat transition finished
    ResetFinished,
}

impl ChatEvent {
    /// Notice shown when a reply could not be produced
    pub fn generation_failed() -> Self {
        ChatEvent::ErrorNotice {
            title: "Error".to_string(),
            message: "Failed to get response from AI. Please try again.".to_string(),
        }
    }

    /// Notice shown when a new chat could not be started
    pub fn reset_failed() -> Self {
        ChatEvent::ErrorNotice {
            title: "Error".to_string(),
            message: "Failed to start a new chat. Please try again.".to_string(),
        }
    }
}
