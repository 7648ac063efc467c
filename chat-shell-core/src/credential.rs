//! API key storage and the prompt that edits it
//!
//! The key is an opaque string kept under its own storage key, separate from
//! the message history. It is only checked for being non-empty.

use crate::storage::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Default storage key of the API key
pub const DEFAULT_CREDENTIAL_KEY: &str = "@gemini_api_key";

/// Reads and writes the stored API key
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl CredentialStore {
    /// Create a store using the default credential key
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, DEFAULT_CREDENTIAL_KEY)
    }

    /// Create a store using a custom credential key
    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key holding the credential
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored key, `None` when nothing (or an empty string) is stored
    pub async fn load(&self) -> crate::Result<Option<String>> {
        let value = self.storage.get(&self.key).await?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    /// Overwrite the stored key. Empty or whitespace-only keys are rejected.
    pub async fn save(&self, value: &str) -> crate::Result<()> {
        if value.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "Please enter a valid API key.".to_string(),
            ));
        }
        self.storage.set(&self.key, value).await?;
        info!("API key saved");
        Ok(())
    }
}

/// How a credential prompt was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The key was validated and stored
    Saved(String),
    /// The prompt was dismissed without saving
    Cancelled,
}

impl PromptOutcome {
    /// The saved key, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            PromptOutcome::Saved(value) => Some(value),
            PromptOutcome::Cancelled => None,
        }
    }
}

/// An open credential prompt.
///
/// Opening loads the stored key to pre-fill the input. Saving validates and
/// stores the key, then closes with the value; cancelling closes without one.
pub struct CredentialPrompt {
    store: CredentialStore,
    prefill: String,
    load_error: Option<String>,
}

impl CredentialPrompt {
    /// Open the prompt, pre-filling from storage.
    ///
    /// A load failure is logged and recorded; the prompt still opens with an
    /// empty pre-fill.
    pub async fn open(store: CredentialStore) -> Self {
        let (prefill, load_error) = match store.load().await {
            Ok(value) => (value.unwrap_or_default(), None),
            Err(e) => {
                error!("Failed to load API key: {}", e);
                (String::new(), Some("Failed to load API key.".to_string()))
            }
        };
        debug!("Credential prompt opened (prefilled: {})", !prefill.is_empty());

        Self {
            store,
            prefill,
            load_error,
        }
    }

    /// Value to show in the input when the prompt opens
    pub fn prefill(&self) -> &str {
        &self.prefill
    }

    /// Notice to show when the stored key could not be read
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Validate and store `value`, closing with it.
    ///
    /// On failure the prompt stays open (the error is returned) so the user
    /// can correct the input or retry.
    pub async fn save(&self, value: &str) -> crate::Result<PromptOutcome> {
        self.store.save(value).await.map_err(|e| {
            if !matches!(e, crate::Error::InvalidInput(_)) {
                error!("Failed to save API key: {}", e);
            }
            e
        })?;
        Ok(PromptOutcome::Saved(value.to_string()))
    }

    /// Close without saving
    pub fn cancel(self) -> PromptOutcome {
        debug!("Credential prompt cancelled");
        PromptOutcome::Cancelled
    }
}
