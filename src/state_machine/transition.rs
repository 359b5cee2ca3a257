//! Pure state transition function
//!
//! Given the same state, gate and event this always produces the same new
//! state and effects. All I/O happens in the runtime executor.

use super::{ConvContext, ConvState, Effect, Event, Gate, Notice, ReplyTicket, PAYMENT_COMPLETED};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Reply {ticket} arrived but no reply is pending")]
    NoReplyPending { ticket: ReplyTicket },
    #[error("Reply {got} arrived out of order (expected {expected})")]
    ReplyOutOfOrder {
        expected: ReplyTicket,
        got: ReplyTicket,
    },
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    gate: Gate,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (gate, event) {
        // ============================================================
        // User submissions
        // ============================================================

        // Blank input is ignored entirely
        (_, Event::UserSubmit { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        // Locked: raise the payment prompt instead of replying
        (Gate::Locked, Event::UserSubmit { .. }) => {
            let new_state = ConvState {
                payment_prompt: true,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Notify(Notice::chat_locked()))
                .with_effect(Effect::PublishState))
        }

        // Unlocked: log the message and start composing a reply
        (Gate::Unlocked, Event::UserSubmit { text }) => {
            let ticket = ReplyTicket(state.next_ticket);
            let new_state = ConvState {
                compose: state.compose.enqueue(ticket),
                next_ticket: state.next_ticket + 1,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append_user_message(text.clone()))
                .with_effect(Effect::ScheduleReply {
                    ticket,
                    prompt: text,
                    delay: context.reply_delay,
                })
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // Responder replies, strictly in scheduling order
        // ============================================================
        (_, Event::ReplyReady { ticket, text }) => match state.compose.next_due() {
            None => Err(TransitionError::NoReplyPending { ticket }),
            Some(expected) if expected != ticket => {
                Err(TransitionError::ReplyOutOfOrder { expected, got: ticket })
            }
            Some(_) => {
                let new_state = ConvState {
                    compose: state.compose.complete_next(),
                    ..state.clone()
                };
                Ok(TransitionResult::new(new_state)
                    .with_effect(Effect::append_responder_message(text.clone()))
                    .with_effect(Effect::ReportReply { text })
                    .with_effect(Effect::PublishState))
            }
        },

        // ============================================================
        // Payment
        // ============================================================
        (_, Event::PaymentSucceeded) => {
            let new_state = ConvState {
                payment_prompt: false,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ReportPayment {
                    notice: PAYMENT_COMPLETED.to_string(),
                })
                .with_effect(Effect::PublishState)
                .with_effect(Effect::Notify(Notice::payment_completed())))
        }
    }
}
