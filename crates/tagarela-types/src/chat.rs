//! Chat session and message types for Tagarela.
//!
//! A session owns an ordered sequence of messages. Messages are always
//! written in user/model pairs, so a session's message count is even.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Number of user+model exchanges sent to the generation service as context.
pub const MAX_HISTORY_TURNS: usize = 5;

/// Maximum number of stored messages loaded as history (one exchange = 2 messages).
pub const MAX_HISTORY_MESSAGES: usize = MAX_HISTORY_TURNS * 2;

/// Author of a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'model'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "model" => Ok(MessageRole::Model),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// One conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub message_count: u32,
}

impl ChatSession {
    /// A fresh, empty session with the given identifier.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            message_count: 0,
        }
    }
}

/// A single utterance within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(session_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Successful result of one orchestration cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    pub reply_text: String,
    pub session_id: Uuid,
    /// History sent as context, excluding the turn just saved.
    pub history_used: Vec<ChatMessage>,
}
