//! Conversation transcript
//!
//! Keeps the running exchange so the chat fallback sees what was said.
//! Token counts are approximate (four characters per token).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    pub content: String,
    pub token_count: usize,
}

impl TranscriptMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_count = (content.len() + 3) / 4;

        Self {
            timestamp: Utc::now(),
            role,
            content,
            token_count,
        }
    }
}

/// Ordered exchange between customer and assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: VecDeque<TranscriptMessage>,
    total_tokens: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        let message = TranscriptMessage::new(role, content);
        self.total_tokens += message.token_count;
        self.messages.push_back(message);
    }

    pub fn messages(&self) -> impl Iterator<Item = &TranscriptMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.total_tokens = 0;
    }
}
