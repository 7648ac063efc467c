//! Session controller for chat-shell
//!
//! This crate owns the in-memory chat, sends messages through a response
//! generator, and runs the new-chat transition.

pub mod controller;
pub mod transition;

pub use chat_shell_core::bus::ChatEvent;
pub use controller::{ControllerSnapshot, Phase, ResetOutcome, SendOutcome, SessionController};
pub use transition::{InstantTransition, TimedTransition, Transition};
