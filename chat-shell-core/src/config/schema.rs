//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for chat-shell
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Durable storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Response generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// New-chat transition timings
    #[serde(default)]
    pub transition: TransitionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Key-value storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Key under which the message history is stored
    #[serde(default = "default_history_key")]
    pub history_key: String,
    /// Key under which the API key is stored
    #[serde(default = "default_credential_key")]
    pub credential_key: String,
}

fn default_storage_dir() -> String {
    "~/.chat-shell/storage".to_string()
}

fn default_history_key() -> String {
    "@chat_history".to_string()
}

fn default_credential_key() -> String {
    "@gemini_api_key".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            history_key: default_history_key(),
            credential_key: default_credential_key(),
        }
    }
}

impl StorageConfig {
    /// Storage directory with a leading `~` expanded to the home directory
    pub fn resolved_dir(&self) -> std::path::PathBuf {
        crate::utils::expand_home(&self.dir)
    }
}

/// Settings for the static response generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Simulated latency before a reply is produced
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
    /// Display name of the assistant
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    /// Avatar reference of the assistant
    #[serde(default = "default_assistant_avatar")]
    pub assistant_avatar: Option<String>,
}

fn default_response_delay_ms() -> u64 {
    1000
}

fn default_assistant_name() -> String {
    "Chatbot".to_string()
}

fn default_assistant_avatar() -> Option<String> {
    Some("robot.png".to_string())
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
            assistant_name: default_assistant_name(),
            assistant_avatar: default_assistant_avatar(),
        }
    }
}

/// Durations of the two new-chat transition phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "default_transition_ms")]
    pub exit_ms: u64,
    #[serde(default = "default_transition_ms")]
    pub entry_ms: u64,
}

fn default_transition_ms() -> u64 {
    300
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            exit_ms: default_transition_ms(),
            entry_ms: default_transition_ms(),
        }
    }
}
