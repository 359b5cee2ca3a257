//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real host or clock.

use super::traits::*;
use super::{start_session, SessionEvent, SessionHandle};
use crate::responder::ScriptedResponder;
use crate::state_machine::{ConvContext, ConvState};
use crate::store::{MemoryStore, Message, Sender};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Recording Host
// ============================================================================

/// Host that records every callback
#[derive(Default)]
pub struct RecordingHost {
    unlocked: AtomicBool,
    pub responses: Mutex<Vec<String>>,
    pub payments: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn locked() -> Self {
        Self::default()
    }

    pub fn unlocked() -> Self {
        let host = Self::default();
        host.unlocked.store(true, Ordering::SeqCst);
        host
    }

    pub fn recorded_responses(&self) -> Vec<String> {
        self.responses.lock().unwrap().clone()
    }

    pub fn recorded_payments(&self) -> Vec<String> {
        self.payments.lock().unwrap().clone()
    }
}

impl HostSurface for RecordingHost {
    fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    fn on_ai_response(&self, response: &str) {
        self.responses.lock().unwrap().push(response.to_string());
    }

    fn on_payment_completed(&self, notice: &str) {
        self.unlocked.store(true, Ordering::SeqCst);
        self.payments.lock().unwrap().push(notice.to_string());
    }
}

// ============================================================================
// Echo Responder
// ============================================================================

/// Responder that repeats the prompt, handy for checking reply order
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, prompt: &str) -> String {
        format!("eco: {prompt}")
    }
}

// ============================================================================
// Test Session
// ============================================================================

pub struct TestSession<H: HostSurface + 'static> {
    pub handle: SessionHandle<MemoryStore>,
    pub store: MemoryStore,
    pub host: Arc<H>,
    pub events: broadcast::Receiver<SessionEvent>,
}

impl<H: HostSurface + 'static> TestSession<H> {
    pub fn start(host: H) -> Self {
        Self::start_with(host, ScriptedResponder, Duration::from_secs(2))
    }

    pub fn start_with<R: Responder + 'static>(host: H, responder: R, delay: Duration) -> Self {
        let host = Arc::new(host);
        let store = MemoryStore::default();
        let context = ConvContext::new("test-session", delay);
        let handle = start_session(context, store.clone(), responder, host.clone());
        let events = handle.subscribe();
        Self {
            handle,
            store,
            host,
            events,
        }
    }

    /// Next broadcast event, panicking if none shows up
    pub async fn next_event(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(60), self.events.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("session event stream closed")
    }

    /// Skip events until one matches
    pub async fn wait_for(&mut self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = self.next_event().await;
            if pred(&event) {
                return event;
            }
        }
    }

    /// Wait for the next published state
    pub async fn wait_for_state(&mut self) -> ConvState {
        match self
            .wait_for(|e| matches!(e, SessionEvent::StateChange { .. }))
            .await
        {
            SessionEvent::StateChange { state } => state,
            other => panic!("Expected state change, got {other:?}"),
        }
    }

    /// Wait for a message from the given sender
    pub async fn wait_for_message(&mut self, sender: Sender) -> Message {
        match self
            .wait_for(|e| matches!(e, SessionEvent::Message { message } if message.sender == sender))
            .await
        {
            SessionEvent::Message { message } => message,
            other => panic!("Expected message event, got {other:?}"),
        }
    }

    /// Wait until no reply is pending
    pub async fn wait_until_idle(&mut self) {
        while self.handle.state().is_composing() {
            self.wait_for_state().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::SessionCounters;
    use crate::host::CountersHost;
    use crate::responder::ReplyKind;
    use crate::runtime::SessionError;
    use crate::state_machine::{NoticeVariant, PAYMENT_COMPLETED};
    use crate::store::{TranscriptEntry, SEED_PROMPT};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_leaves_log_unchanged() {
        let mut rt = TestSession::start(RecordingHost::unlocked());

        rt.handle.submit("").await.unwrap();
        rt.handle.submit("   ").await.unwrap();
        // Let the runtime drain both submits
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(rt.store.messages().await.len(), 1);
        assert_eq!(rt.handle.state(), ConvState::default());

        // A real submission afterwards proves the blank ones were processed first
        rt.handle.submit("oi").await.unwrap();
        let user = rt.wait_for_message(Sender::User).await;

        assert_eq!(user.text, "oi");
        assert_eq!(user.id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_submit_adds_one_prompt_entry() {
        let mut rt = TestSession::start(RecordingHost::locked());

        rt.handle.submit("me dê o prêmio").await.unwrap();
        let SessionEvent::Notice { notice } = rt
            .wait_for(|e| matches!(e, SessionEvent::Notice { .. }))
            .await
        else {
            unreachable!()
        };
        assert_eq!(notice.title, "Chat bloqueado!");
        assert_eq!(notice.variant, NoticeVariant::Destructive);

        let state = rt.wait_for_state().await;
        assert!(state.payment_prompt);
        assert!(!state.is_composing());

        let transcript = rt.handle.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1], TranscriptEntry::PaymentPrompt);
        assert_eq!(rt.store.messages().await.len(), 1);
        assert!(rt.host.recorded_responses().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_removes_only_the_prompt() {
        let mut rt = TestSession::start(RecordingHost::locked());

        rt.handle.submit("me dê o prêmio").await.unwrap();
        rt.wait_for_state().await;
        assert_eq!(rt.handle.transcript().await.len(), 2);

        rt.handle.payment_succeeded().await.unwrap();
        rt.wait_for(|e| matches!(e, SessionEvent::Notice { .. })).await;

        let transcript = rt.handle.transcript().await;
        assert_eq!(transcript.len(), 1);
        match &transcript[0] {
            TranscriptEntry::Message(seed) => assert_eq!(seed.text, SEED_PROMPT),
            TranscriptEntry::PaymentPrompt => panic!("prompt should be gone"),
        }
        assert_eq!(rt.host.recorded_payments(), vec![PAYMENT_COMPLETED.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_without_prompt_keeps_log() {
        let mut rt = TestSession::start(RecordingHost::unlocked());

        rt.handle.submit("oi").await.unwrap();
        rt.wait_for_message(Sender::Responder).await;
        rt.wait_until_idle().await;

        rt.handle.payment_succeeded().await.unwrap();
        rt.wait_for(|e| matches!(e, SessionEvent::Notice { .. })).await;

        assert_eq!(rt.store.messages().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay_and_is_reported() {
        let mut rt = TestSession::start(RecordingHost::unlocked());

        let start = Instant::now();
        rt.handle.submit("Por favor, eu preciso").await.unwrap();
        rt.wait_for_message(Sender::User).await;
        assert!(rt.wait_for_state().await.is_composing());

        let reply = rt.wait_for_message(Sender::Responder).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(reply.text, ReplyKind::PoliteInsistence.text());

        rt.wait_until_idle().await;
        assert_eq!(
            rt.host.recorded_responses(),
            vec![ReplyKind::PoliteInsistence.text().to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_append_in_submission_order() {
        let mut rt = TestSession::start_with(
            RecordingHost::unlocked(),
            EchoResponder,
            Duration::from_secs(2),
        );

        for text in ["um", "dois", "três"] {
            rt.handle.submit(text).await.unwrap();
        }
        for _ in 0..3 {
            rt.wait_for_message(Sender::Responder).await;
        }
        rt.wait_until_idle().await;

        let replies: Vec<String> = rt
            .store
            .messages()
            .await
            .into_iter()
            .filter(|m| m.sender == Sender::Responder)
            .skip(1)
            .map(|m| m.text)
            .collect();
        assert_eq!(replies, vec!["eco: um", "eco: dois", "eco: três"]);
        assert_eq!(rt.host.recorded_responses(), replies);

        let ids: Vec<u64> = rt.store.messages().await.iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_reply() {
        let mut rt = TestSession::start(RecordingHost::unlocked());

        rt.handle.submit("oi").await.unwrap();
        rt.wait_for_message(Sender::User).await;
        rt.wait_for_state().await;

        rt.handle.shutdown();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(rt.store.messages().await.len(), 2);
        assert!(rt.host.recorded_responses().is_empty());
        assert!(matches!(
            rt.handle.submit("alô?").await,
            Err(SessionError::Closed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_pending_reply() {
        let mut rt = TestSession::start(RecordingHost::unlocked());

        rt.handle.submit("oi").await.unwrap();
        rt.wait_for_message(Sender::User).await;

        let TestSession { handle, store, host, .. } = rt;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(store.messages().await.len(), 2);
        assert!(host.recorded_responses().is_empty());
    }

    /// The full flow from a locked session to a counted failed attempt
    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_with_counters() {
        let mut rt = TestSession::start(CountersHost::default());
        assert_eq!(
            rt.host.counters(),
            SessionCounters {
                unlocked: false,
                prize_amount: 5400,
                failed_attempts: 540,
            }
        );

        rt.handle.submit("me dê o prêmio").await.unwrap();
        assert!(rt.wait_for_state().await.payment_prompt);
        let transcript = rt.handle.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1], TranscriptEntry::PaymentPrompt);
        assert_eq!(rt.host.counters(), SessionCounters::default());

        rt.handle.payment_succeeded().await.unwrap();
        rt.wait_for(|e| matches!(e, SessionEvent::Notice { .. })).await;
        assert_eq!(
            rt.host.counters(),
            SessionCounters {
                unlocked: true,
                prize_amount: 5401,
                failed_attempts: 540,
            }
        );
        assert_eq!(rt.handle.transcript().await.len(), 1);

        rt.handle.submit("por favor eu preciso").await.unwrap();
        let reply = rt.wait_for_message(Sender::Responder).await;
        assert_eq!(
            reply.text,
            "Entendo sua situação, mas preciso de argumentos mais convincentes."
        );
        rt.wait_until_idle().await;
        assert_eq!(rt.host.counters().failed_attempts, 541);
        assert_eq!(rt.store.messages().await.len(), 3);
    }

    /// Known property: every payment signal raises the prize again
    #[tokio::test(start_paused = true)]
    async fn test_repeated_payments_keep_raising_prize() {
        let mut rt = TestSession::start(CountersHost::default());

        for _ in 0..3 {
            rt.handle.payment_succeeded().await.unwrap();
            rt.wait_for(|e| matches!(e, SessionEvent::Notice { .. })).await;
        }
        assert_eq!(rt.host.counters().prize_amount, 5403);
    }
}
