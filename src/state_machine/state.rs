//! Conversation state types

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Identifies one scheduled responder reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyTicket(pub u64);

impl std::fmt::Display for ReplyTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the host has unlocked the chat, sampled per event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Locked,
    Unlocked,
}

impl Gate {
    pub fn from_unlocked(unlocked: bool) -> Self {
        if unlocked {
            Gate::Unlocked
        } else {
            Gate::Locked
        }
    }
}

/// Responder activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComposeState {
    /// Nothing in flight
    #[default]
    Idle,

    /// At least one reply scheduled, oldest first
    Composing { pending: VecDeque<ReplyTicket> },
}

impl ComposeState {
    pub fn is_composing(&self) -> bool {
        matches!(self, ComposeState::Composing { .. })
    }

    /// The reply that must arrive next
    pub fn next_due(&self) -> Option<ReplyTicket> {
        match self {
            ComposeState::Idle => None,
            ComposeState::Composing { pending } => pending.front().copied(),
        }
    }

    pub fn pending_count(&self) -> usize {
        match self {
            ComposeState::Idle => 0,
            ComposeState::Composing { pending } => pending.len(),
        }
    }

    #[must_use]
    pub fn enqueue(&self, ticket: ReplyTicket) -> Self {
        let mut pending = match self {
            ComposeState::Idle => VecDeque::new(),
            ComposeState::Composing { pending } => pending.clone(),
        };
        pending.push_back(ticket);
        ComposeState::Composing { pending }
    }

    /// Drop the oldest pending reply, falling back to idle when none remain
    #[must_use]
    pub fn complete_next(&self) -> Self {
        match self {
            ComposeState::Idle => ComposeState::Idle,
            ComposeState::Composing { pending } => {
                let mut pending = pending.clone();
                pending.pop_front();
                if pending.is_empty() {
                    ComposeState::Idle
                } else {
                    ComposeState::Composing { pending }
                }
            }
        }
    }
}

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConvState {
    pub compose: ComposeState,

    /// Payment prompt overlay, raised by a submit while locked
    pub payment_prompt: bool,

    /// Next ticket to hand out
    pub next_ticket: u64,
}

impl ConvState {
    pub fn is_composing(&self) -> bool {
        self.compose.is_composing()
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub session_id: String,
    pub reply_delay: Duration,
}

impl ConvContext {
    pub fn new(session_id: impl Into<String>, reply_delay: Duration) -> Self {
        Self {
            session_id: session_id.into(),
            reply_delay,
        }
    }
}
