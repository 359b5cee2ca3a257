//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::store::{MemoryStore, Message, Sender};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for conversation messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message and return it with its assigned id
    async fn append(&self, sender: Sender, text: &str) -> Message;

    /// Get all messages, oldest first
    async fn messages(&self) -> Vec<Message>;
}

/// Produces the responder's reply to a user message
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, prompt: &str) -> String;
}

/// The page-level surface that owns the session counters
pub trait HostSurface: Send + Sync {
    fn is_unlocked(&self) -> bool;

    /// Called once per responder reply, after it has been appended
    fn on_ai_response(&self, response: &str);

    /// Called once per successful payment
    fn on_payment_completed(&self, notice: &str);
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn append(&self, sender: Sender, text: &str) -> Message {
        (**self).append(sender, text).await
    }

    async fn messages(&self) -> Vec<Message> {
        (**self).messages().await
    }
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for Arc<T> {
    async fn respond(&self, prompt: &str) -> String {
        (**self).respond(prompt).await
    }
}

impl<T: HostSurface + ?Sized> HostSurface for Arc<T> {
    fn is_unlocked(&self) -> bool {
        (**self).is_unlocked()
    }

    fn on_ai_response(&self, response: &str) {
        (**self).on_ai_response(response);
    }

    fn on_payment_completed(&self, notice: &str) {
        (**self).on_payment_completed(notice);
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, sender: Sender, text: &str) -> Message {
        MemoryStore::append(self, sender, text).await
    }

    async fn messages(&self) -> Vec<Message> {
        MemoryStore::messages(self).await
    }
}
