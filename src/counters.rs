//! Session counters owned by the host surface

use serde::{Deserialize, Serialize};

/// Starting prize, chosen for display effect
pub const INITIAL_PRIZE: u64 = 5400;

/// Starting failed-attempt count, chosen for display effect
pub const INITIAL_FAILED_ATTEMPTS: u64 = 540;

/// Phrases that would mark a reply as a win.
///
/// The scripted responder never produces any of these, so in practice every
/// reply counts as a failed attempt.
pub const WIN_PHRASES: [&str; 2] = ["parabéns", "venceu"];

pub fn is_winning_reply(text: &str) -> bool {
    let lower = text.to_lowercase();
    WIN_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub unlocked: bool,
    pub prize_amount: u64,
    pub failed_attempts: u64,
}

impl SessionCounters {
    pub fn new(prize_amount: u64, failed_attempts: u64) -> Self {
        Self {
            unlocked: false,
            prize_amount,
            failed_attempts,
        }
    }

    /// Unlock the chat and add one to the prize. Not idempotent.
    pub fn on_payment_success(&mut self) {
        self.unlocked = true;
        self.prize_amount = self.prize_amount.saturating_add(1);
    }

    /// Count a responder reply. Returns true if it was counted as a failure.
    pub fn on_responder_reply(&mut self, text: &str) -> bool {
        if is_winning_reply(text) {
            return false;
        }
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        true
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new(INITIAL_PRIZE, INITIAL_FAILED_ATTEMPTS)
    }
}
