//! Event bus for the rendering layer
//!
//! The controller publishes what happened (messages appended, typing
//! started and stopped, notices, reset phases) and any number of views
//! subscribe to it.

pub mod events;
pub mod queue;

pub use events::ChatEvent;
pub use queue::EventBus;
