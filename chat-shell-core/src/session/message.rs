//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author id of the local user
pub const USER_ID: u32 = 1;

/// Author id of the assistant
pub const ASSISTANT_ID: u32 = 2;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// Stable author identity as stored: a number, or a string for records
/// written by other clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorId {
    Num(u32),
    Str(String),
}

impl AuthorId {
    fn is(&self, id: u32) -> bool {
        match self {
            AuthorId::Num(n) => *n == id,
            AuthorId::Str(s) => s.trim().parse::<u32>().ok() == Some(id),
        }
    }
}

impl From<u32> for AuthorId {
    fn from(id: u32) -> Self {
        AuthorId::Num(id)
    }
}

/// Author record stored with each message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    /// Stable identity (1 = user, 2 = assistant)
    #[serde(rename = "_id", alias = "id")]
    pub id: AuthorId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar reference; bundled asset handles stored as numbers are read
    /// back as their decimal string
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_avatar"
    )]
    pub avatar: Option<String>,
}

impl ChatUser {
    /// The local user, without display metadata
    pub fn user() -> Self {
        Self {
            id: USER_ID.into(),
            name: None,
            avatar: None,
        }
    }

    /// The assistant with its display metadata
    pub fn assistant(name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id: ASSISTANT_ID.into(),
            name: Some(name.into()),
            avatar,
        }
    }

    /// Author derived from the stable id
    pub fn author(&self) -> Author {
        if self.id.is(ASSISTANT_ID) {
            Author::Assistant
        } else {
            Author::User
        }
    }
}

fn deserialize_avatar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "avatar must be a string or number, got {}",
            other
        ))),
    }
}

/// A chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier within the session
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Message content
    pub text: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Author record
    pub user: ChatUser,
}

impl Message {
    /// Create a message with a fresh id and the current timestamp
    pub fn new(text: impl Into<String>, user: ChatUser) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            created_at: Utc::now(),
            user,
        }
    }

    /// Create a message written by the local user
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(text, ChatUser::user())
    }

    /// Who wrote this message
    pub fn author(&self) -> Author {
        self.user.author()
    }
}

/// The ordered message log of one chat.
///
/// Stored oldest first; serialized as a bare JSON array. There is no API to
/// remove or reorder messages: a session only grows, or is replaced by an
/// empty one on reset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from messages in insertion order
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages newest first, the order chat views render in
    pub fn newest_first(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev()
    }

    /// Most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
