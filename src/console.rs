//! Terminal rendering and command parsing for the host surface

use crate::counters::SessionCounters;
use crate::state_machine::{ConvState, Notice, NoticeVariant};
use crate::store::{Message, Sender, TranscriptEntry};
use chrono::Local;

pub const TITLE: &str = "Convença a IA";
pub const SUBTITLE: &str = "Ganhe todo o prêmio acumulado se conseguir persuadir nossa IA!";
pub const FOOTER: &str = "© 2025 Convince AI - Uma chance de $1 para ganhar tudo!\n\
                          Esta é apenas uma demonstração - Nenhuma transação real é processada";
pub const HELP: &str = "/pagar  simular pagamento de $1\n\
                        /status mostrar prêmio e tentativas\n\
                        /ajuda  mostrar esta ajuda\n\
                        /sair   encerrar a sessão";

const COMPOSING: &str = "IA está digitando...";
const PAYMENT_PROMPT: &str = "[pagamento] Pague $1 para desbloquear o chat (/pagar)";

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Pay,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/pagar" => Command::Pay,
            "/status" => Command::Status,
            "/ajuda" => Command::Help,
            "/sair" => Command::Quit,
            _ => Command::Say(line.to_string()),
        }
    }
}

/// Dollar amount with thousands separators, e.g. `$5,400`
pub fn format_prize(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

pub fn prize_display(counters: &SessionCounters) -> String {
    format!(
        "Prêmio acumulado: {} | Tentativas falhas: {}",
        format_prize(counters.prize_amount),
        counters.failed_attempts
    )
}

pub fn input_placeholder(unlocked: bool) -> &'static str {
    if unlocked {
        "Digite sua mensagem..."
    } else {
        "Chat bloqueado - Faça o pagamento para desbloquear"
    }
}

pub fn render_message(message: &Message) -> String {
    let who = match message.sender {
        Sender::User => "Você",
        Sender::Responder => "IA",
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    format!("[{time}] {who}: {}", message.text)
}

pub fn render_entry(entry: &TranscriptEntry) -> String {
    match entry {
        TranscriptEntry::Message(message) => render_message(message),
        TranscriptEntry::PaymentPrompt => PAYMENT_PROMPT.to_string(),
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let marker = match notice.variant {
        NoticeVariant::Default => '*',
        NoticeVariant::Destructive => '!',
    };
    format!("{marker} {} {}", notice.title, notice.description)
}

/// Tracks what the terminal already shows so state changes print only deltas
#[derive(Debug, Default)]
pub struct Renderer {
    composing: bool,
    payment_prompt: bool,
}

impl Renderer {
    /// Start from what the initial transcript already showed
    pub fn from_state(state: &ConvState) -> Self {
        Self {
            composing: state.is_composing(),
            payment_prompt: state.payment_prompt,
        }
    }

    pub fn on_state(&mut self, state: &ConvState) -> Vec<String> {
        let mut lines = Vec::new();
        if state.is_composing() && !self.composing {
            lines.push(COMPOSING.to_string());
        }
        if state.payment_prompt && !self.payment_prompt {
            lines.push(PAYMENT_PROMPT.to_string());
        }
        self.composing = state.is_composing();
        self.payment_prompt = state.payment_prompt;
        lines
    }
}
