//! Durable persistence of a session under a fixed storage key

use super::message::Session;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Default storage key of the message history
pub const DEFAULT_HISTORY_KEY: &str = "@chat_history";

/// Sole reader and writer of the history key.
///
/// The store never touches an in-memory session: callers hand it snapshots
/// to write and receive fresh values on load.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    /// Create a store using the default history key
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, DEFAULT_HISTORY_KEY)
    }

    /// Create a store using a custom history key
    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key holding the history
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored session.
    ///
    /// An absent key yields an empty session. A malformed payload is
    /// reported as [`crate::Error::Deserialization`] and left in place.
    pub async fn load(&self) -> crate::Result<Session> {
        let raw = self.storage.get(&self.key).await.map_err(|e| {
            error!("Failed to load messages: {}", e);
            into_persistence(e)
        })?;

        let Some(raw) = raw else {
            debug!("No stored history under {}", self.key);
            return Ok(Session::new());
        };

        let session: Session = serde_json::from_str(&raw).map_err(|e| {
            warn!("Stored history under {} is malformed: {}", self.key, e);
            crate::Error::Deserialization(e.to_string())
        })?;
        debug!("Loaded {} messages from {}", session.len(), self.key);
        Ok(session)
    }

    /// Serialize the whole session and overwrite the stored value
    pub async fn save(&self, session: &Session) -> crate::Result<()> {
        let payload = serde_json::to_string(session)?;
        self.storage.set(&self.key, &payload).await.map_err(|e| {
            error!("Failed to save messages: {}", e);
            into_persistence(e)
        })?;
        debug!("Saved {} messages to {}", session.len(), self.key);
        Ok(())
    }

    /// Remove the stored history entirely
    pub async fn clear(&self) -> crate::Result<()> {
        self.storage.remove(&self.key).await.map_err(|e| {
            error!("Failed to clear messages: {}", e);
            into_persistence(e)
        })?;
        debug!("Cleared {}", self.key);
        Ok(())
    }
}

fn into_persistence(e: crate::Error) -> crate::Error {
    match e {
        crate::Error::Persistence(_) => e,
        other => crate::Error::Persistence(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ChatUser, Message};
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn sample_session() -> Session {
        let mut session = Session::new();
        session.push(Message::from_user("hello"));
        session.push(Message::new(
            "You said: \"hello\". This is a static response from the chatbot.",
            ChatUser::assistant("Chatbot", Some("robot.png".to_string())),
        ));
        session
    }

    #[tokio::test]
    async fn test_load_absent_is_empty() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(Arc::new(FileStore::new(temp_dir.path())));
        let session = sample_session();

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        store.save(&sample_session()).await.unwrap();

        let mut shorter = Session::new();
        shorter.push(Message::from_user("only"));
        store.save(&shorter).await.unwrap();

        assert_eq!(store.load().await.unwrap(), shorter);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_left_in_place() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(DEFAULT_HISTORY_KEY, "{broken").await.unwrap();
        let store = SessionStore::new(storage.clone());

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, crate::Error::Deserialization(_)));
        assert_eq!(
            storage.get(DEFAULT_HISTORY_KEY).await.unwrap().as_deref(),
            Some("{broken")
        );
    }

    #[tokio::test]
    async fn test_loads_history_written_by_other_clients() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                DEFAULT_HISTORY_KEY,
                r#"[{"_id":"m1","text":"hi","createdAt":"2024-05-01T10:00:00Z","user":{"_id":"1"}},
                    {"_id":"m2","text":"hello","createdAt":"2024-05-01T10:00:01Z","user":{"_id":2,"name":"Chatbot","avatar":7}}]"#,
            )
            .await
            .unwrap();
        let store = SessionStore::new(storage);

        let session = store.load().await.unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[1].user.avatar.as_deref(), Some("7"));

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());
        store.save(&sample_session()).await.unwrap();

        store.clear().await.unwrap();

        assert!(!storage.contains(DEFAULT_HISTORY_KEY));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failures_are_persistence_errors() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::with_key(storage.clone(), "history");
        storage.set_fail_writes(true);
        storage.set_fail_reads(true);

        assert!(matches!(
            store.save(&sample_session()).await,
            Err(crate::Error::Persistence(_))
        ));
        assert!(matches!(store.clear().await, Err(crate::Error::Persistence(_))));
        assert!(matches!(store.load().await, Err(crate::Error::Persistence(_))));
    }
}
