//! Chat session history
//!
//! A session is the ordered log of messages exchanged in one chat. It is
//! persisted as a single JSON array under a fixed storage key.

pub mod message;
pub mod store;

pub use message::{Author, AuthorId, ChatUser, Message, Session, ASSISTANT_ID, USER_ID};
pub use store::SessionStore;
