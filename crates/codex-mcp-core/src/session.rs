//! Session types for codex conversation tracking.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a codex conversation.
///
/// The value is produced by the codex process and treated as opaque. It is
/// normally UUID-shaped, but nothing here relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier reported by codex.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier parses as a UUID.
    pub fn is_uuid_shaped(&self) -> bool {
        Uuid::parse_str(&self.0).is_ok()
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata kept for a conversation started through this server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier
    pub id: SessionId,
    /// When the start invocation completed
    pub created_at: DateTime<Utc>,
    /// Prompt that opened the conversation
    pub initial_prompt: String,
}

impl SessionRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: SessionId, initial_prompt: impl Into<String>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            initial_prompt: initial_prompt.into(),
        }
    }
}
