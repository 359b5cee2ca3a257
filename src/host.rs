//! Host surface backed by the session counters

use crate::counters::SessionCounters;
use crate::runtime::HostSurface;
use tokio::sync::watch;

/// Owns the counters and exposes them to the conversation runtime.
///
/// Counters live in a watch channel so the rendering side can follow prize
/// and attempt changes without polling.
#[derive(Debug)]
pub struct CountersHost {
    counters: watch::Sender<SessionCounters>,
}

impl CountersHost {
    pub fn new(initial: SessionCounters) -> Self {
        let (counters, _) = watch::channel(initial);
        Self { counters }
    }

    pub fn counters(&self) -> SessionCounters {
        *self.counters.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionCounters> {
        self.counters.subscribe()
    }
}

impl Default for CountersHost {
    fn default() -> Self {
        Self::new(SessionCounters::default())
    }
}

impl HostSurface for CountersHost {
    fn is_unlocked(&self) -> bool {
        self.counters.borrow().unlocked
    }

    fn on_ai_response(&self, response: &str) {
        self.counters.send_modify(|counters| {
            if counters.on_responder_reply(response) {
                tracing::debug!(
                    failed_attempts = counters.failed_attempts,
                    "Failed attempt recorded"
                );
            }
        });
    }

    fn on_payment_completed(&self, notice: &str) {
        self.counters.send_modify(|counters| {
            counters.on_payment_success();
            tracing::info!(
                notice = %notice,
                prize_amount = counters.prize_amount,
                "Chat unlocked"
            );
        });
    }
}
