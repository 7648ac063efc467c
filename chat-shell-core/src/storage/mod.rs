//! Durable key-value storage
//!
//! The chat shell keeps two values: the serialized message history and the
//! API key. Both go through the [`KeyValueStore`] seam so the backing
//! medium can be swapped without touching the session logic.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Whole-value string storage addressed by key.
///
/// Implementations must make `set` atomic per key: a concurrent or later
/// `get` observes either the previous or the new value, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> crate::Result<()>;

    /// Remove `key`; removing an absent key succeeds
    async fn remove(&self, key: &str) -> crate::Result<()>;
}
