//! Chat transcript messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Apology shown when a chat request fails, so no user message is left unanswered
pub const CHAT_FAILURE_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single message in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// The fixed assistant reply used when a chat request fails
    pub fn failure_reply() -> Self {
        Self::assistant(CHAT_FAILURE_REPLY)
    }
}
