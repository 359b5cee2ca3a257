//! Events that can occur in a conversation

use crate::state_machine::state::ReplyTicket;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    UserSubmit { text: String },

    // Responder events
    ReplyReady { ticket: ReplyTicket, text: String },

    // Payment collaborator
    PaymentSucceeded,
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }
}
