//! Runtime for executing a chat session
//!
//! One runtime task per session owns the conversation state and applies
//! events serially. Everything the runtime spawns is bound to the session's
//! cancellation token, so shutting a session down (or dropping its handle)
//! cancels any reply still being composed.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::config::SessionConfig;
use crate::host::CountersHost;
use crate::responder::{LoggingResponder, ScriptedResponder};
use crate::state_machine::{ConvContext, ConvState, Event, Notice};
use crate::store::{self, MemoryStore, Message, TranscriptEntry};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Events sent to whatever renders the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Message {
        message: Message,
    },
    StateChange {
        state: ConvState,
    },
    Notice {
        notice: Notice,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} has shut down")]
    Closed(String),
}

/// Handle to interact with a running session
pub struct SessionHandle<S> {
    session_id: String,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    state_rx: watch::Receiver<ConvState>,
    store: S,
    cancel: CancellationToken,
}

impl<S: MessageStore> SessionHandle<S> {
    /// Send user text to the conversation
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(Event::submit(text)).await
    }

    /// Signal from the payment collaborator
    pub async fn payment_succeeded(&self) -> Result<(), SessionError> {
        self.send(Event::PaymentSucceeded).await
    }

    async fn send(&self, event: Event) -> Result<(), SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Closed(self.session_id.clone()));
        }
        self.event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(self.session_id.clone()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Latest published conversation state
    pub fn state(&self) -> ConvState {
        self.state_rx.borrow().clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.store.messages().await
    }

    /// The log with the payment prompt overlay merged in
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        let payment_prompt = self.state_rx.borrow().payment_prompt;
        store::transcript(self.messages().await, payment_prompt)
    }

    /// End the session, cancelling any reply still being composed
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(session_id = %self.session_id, "Shutting down session");
        }
        self.cancel.cancel();
    }
}

impl<S> Drop for SessionHandle<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a runtime for a new session and return its handle
pub fn start_session<S, R, H>(
    context: ConvContext,
    store: S,
    responder: R,
    host: Arc<H>,
) -> SessionHandle<S>
where
    S: MessageStore + Clone + 'static,
    R: Responder + 'static,
    H: HostSurface + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (state_tx, state_rx) = watch::channel(ConvState::default());
    let cancel = CancellationToken::new();
    let session_id = context.session_id.clone();

    let runtime = ConversationRuntime::new(
        context,
        store.clone(),
        responder,
        host,
        event_rx,
        event_tx.clone(),
        broadcast_tx.clone(),
        state_tx,
        cancel.clone(),
    );
    tokio::spawn(runtime.run());

    SessionHandle {
        session_id,
        event_tx,
        broadcast_tx,
        state_rx,
        store,
        cancel,
    }
}

/// Start a session with the scripted responder and a fresh seeded log
pub fn start_production_session(
    config: &SessionConfig,
    host: Arc<CountersHost>,
) -> SessionHandle<MemoryStore> {
    let context = ConvContext::new(uuid::Uuid::new_v4().to_string(), config.reply_delay);
    let responder = LoggingResponder::new(Arc::new(ScriptedResponder));
    start_session(context, MemoryStore::default(), responder, host)
}
