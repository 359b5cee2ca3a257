//! Effects produced by state transitions

use crate::state_machine::state::ReplyTicket;
use crate::store::Sender;
use std::time::Duration;

/// Text reported to the host once a payment has gone through
pub const PAYMENT_COMPLETED: &str = "Pagamento concluído";

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the log
    AppendMessage { sender: Sender, text: String },

    /// Have the responder answer `prompt` after `delay`
    ScheduleReply {
        ticket: ReplyTicket,
        prompt: String,
        delay: Duration,
    },

    /// Hand a responder reply to the host (`on_ai_response`)
    ReportReply { text: String },

    /// Tell the host the payment went through
    ReportPayment { notice: String },

    /// Show a transient notice to the user
    Notify(Notice),

    /// Publish the new state to observers
    PublishState,
}

impl Effect {
    pub fn append_user_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn append_responder_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::Responder,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A toast-style notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn chat_locked() -> Self {
        Self {
            title: "Chat bloqueado!".to_string(),
            description: "Faça o pagamento para desbloquear o chat.".to_string(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn payment_completed() -> Self {
        Self {
            title: PAYMENT_COMPLETED.to_string(),
            description: "Chat desbloqueado. Boa sorte!".to_string(),
            variant: NoticeVariant::Default,
        }
    }
}
