//! Conversation runtime executor

use super::traits::{HostSurface, MessageStore, Responder};
use super::SessionEvent;

use crate::state_machine::transition::TransitionError;
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, Gate, ReplyTicket};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A reply waiting in the composer queue
#[derive(Debug)]
struct ScheduledReply {
    ticket: ReplyTicket,
    prompt: String,
    due: Instant,
}

/// Generic conversation runtime that can work with any store, responder and host
pub struct ConversationRuntime<S, R, H>
where
    S: MessageStore + 'static,
    R: Responder + 'static,
    H: HostSurface + 'static,
{
    context: ConvContext,
    state: ConvState,
    store: S,
    responder: Arc<R>,
    host: Arc<H>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    state_tx: watch::Sender<ConvState>,
    /// Session lifetime; cancelling it stops the loop and every pending reply
    cancel: CancellationToken,
    composer_tx: mpsc::UnboundedSender<ScheduledReply>,
    composer_rx: Option<mpsc::UnboundedReceiver<ScheduledReply>>,
}

impl<S, R, H> ConversationRuntime<S, R, H>
where
    S: MessageStore + 'static,
    R: Responder + 'static,
    H: HostSurface + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: ConvContext,
        store: S,
        responder: R,
        host: Arc<H>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        state_tx: watch::Sender<ConvState>,
        cancel: CancellationToken,
    ) -> Self {
        let (composer_tx, composer_rx) = mpsc::unbounded_channel();
        Self {
            context,
            state: ConvState::default(),
            store,
            responder: Arc::new(responder),
            host,
            event_rx,
            event_tx,
            broadcast_tx,
            state_tx,
            cancel,
            composer_tx,
            composer_rx: Some(composer_rx),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting conversation runtime");

        if let Some(composer_rx) = self.composer_rx.take() {
            self.spawn_composer(composer_rx);
        }

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break,

                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event).await {
                        tracing::warn!(error = %e, "Event rejected");
                        let _ = self.broadcast_tx.send(SessionEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }

                else => break,
            }
        }

        // Make sure the composer goes down with us whatever ended the loop
        self.cancel.cancel();
        tracing::info!(session_id = %self.context.session_id, "Conversation runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let gate = Gate::from_unlocked(self.host.is_unlocked());
        let result = transition(&self.state, &self.context, gate, event)?;
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { sender, text } => {
                let message = self.store.append(sender, &text).await;
                tracing::debug!(message_id = message.id, sender = ?message.sender, "Message appended");
                let _ = self.broadcast_tx.send(SessionEvent::Message { message });
            }

            Effect::ScheduleReply {
                ticket,
                prompt,
                delay,
            } => {
                tracing::debug!(
                    %ticket,
                    delay_ms = %delay.as_millis(),
                    pending = self.state.compose.pending_count(),
                    "Reply scheduled"
                );
                let scheduled = ScheduledReply {
                    ticket,
                    prompt,
                    due: Instant::now() + delay,
                };
                if self.composer_tx.send(scheduled).is_err() {
                    tracing::warn!(%ticket, "Composer is gone, reply dropped");
                }
            }

            Effect::ReportReply { text } => {
                self.host.on_ai_response(&text);
            }

            Effect::ReportPayment { notice } => {
                tracing::info!(session_id = %self.context.session_id, "Payment completed");
                self.host.on_payment_completed(&notice);
            }

            Effect::Notify(notice) => {
                let _ = self.broadcast_tx.send(SessionEvent::Notice { notice });
            }

            Effect::PublishState => {
                self.state_tx.send_replace(self.state.clone());
                let _ = self.broadcast_tx.send(SessionEvent::StateChange {
                    state: self.state.clone(),
                });
            }
        }
    }

    /// Spawn the single task that composes replies one after another.
    ///
    /// Deadlines are taken from a fixed delay, so serving the queue in order
    /// keeps every reply on time and appends them in scheduling order.
    fn spawn_composer(&self, mut composer_rx: mpsc::UnboundedReceiver<ScheduledReply>) {
        let responder = self.responder.clone();
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                let scheduled = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    next = composer_rx.recv() => match next {
                        Some(scheduled) => scheduled,
                        None => break,
                    },
                };
                let ticket = scheduled.ticket;

                // Race the reply against session teardown
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        tracing::info!(%ticket, "Pending reply cancelled");
                        break;
                    }

                    text = compose(responder.as_ref(), &scheduled) => {
                        if event_tx.send(Event::ReplyReady { ticket, text }).await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Composer stopped");
        });
    }
}

async fn compose<R: Responder + ?Sized>(responder: &R, scheduled: &ScheduledReply) -> String {
    tokio::time::sleep_until(scheduled.due).await;
    responder.respond(&scheduled.prompt).await
}
