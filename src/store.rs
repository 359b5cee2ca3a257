//! In-memory message log
//!
//! The log is append-only and purely conversational. The payment prompt is
//! not stored here; it is overlay state owned by the conversation state and
//! merged in when a transcript is rendered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Opening question every session starts with
pub const SEED_PROMPT: &str = "Por que você acha que merece ganhar o prêmio?";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Responder,
}

/// A single chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, ordered message log with strictly increasing ids
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageLog {
    /// Create a log holding only the responder's seed message
    pub fn seeded(seed: &str) -> Self {
        let mut log = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        log.append(Sender::Responder, seed);
        log
    }

    pub fn append(&mut self, sender: Sender, text: &str) -> Message {
        let message = Message {
            id: self.next_id,
            text: text.to_string(),
            sender,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::seeded(SEED_PROMPT)
    }
}

/// Shared in-memory store for one session's log
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    log: Arc<RwLock<MessageLog>>,
}

impl MemoryStore {
    pub async fn append(&self, sender: Sender, text: &str) -> Message {
        self.log.write().await.append(sender, text)
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.log.read().await.messages().to_vec()
    }
}

/// One rendered row of the chat: a real message or the payment prompt overlay
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message(Message),
    PaymentPrompt,
}

/// Merge the log with the overlay. The prompt, when visible, is always last.
pub fn transcript(messages: Vec<Message>, payment_prompt: bool) -> Vec<TranscriptEntry> {
    let mut entries: Vec<TranscriptEntry> =
        messages.into_iter().map(TranscriptEntry::Message).collect();
    if payment_prompt {
        entries.push(TranscriptEntry::PaymentPrompt);
    }
    entries
}
