//! In-process key-value store

use super::KeyValueStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Keeps values in a map. Useful for embedding and tests; failures can be
/// switched on to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail until switched off
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set`/`remove` fail until switched off
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Whether a value is present under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }

    /// Number of successful `set`/`remove` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self, key: &str) -> crate::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(crate::Error::Persistence(format!(
                "write to {} rejected",
                key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(crate::Error::Persistence(format!("read of {} rejected", key)));
        }
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        self.check_write(key)?;
        self.values.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> crate::Result<()> {
        self.check_write(key)?;
        self.values.lock().remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert!(store.contains("k"));
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        assert!(!store.contains("k"));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();

        store.set_fail_writes(true);
        assert!(store.set("k", "w").await.unwrap_err().is_persistence());
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.set_fail_reads(true);
        assert!(store.get("k").await.is_err());
    }
}
