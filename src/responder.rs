//! Scripted responder
//!
//! There is no inference here: a reply is picked by case-insensitive
//! substring rules evaluated in a fixed order, first match wins.


use crate::runtime::Responder;
use async_trait::async_trait;
use std::sync::Arc;

/// The four canned replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// "por favor" with "preciso" or "necessito"
    PoliteInsistence,
    /// "doar" with "caridade"
    CharityAppeal,
    /// "investir" with "negócio" or "startup"
    BusinessPitch,
    /// Anything else
    Unconvinced,
}

impl ReplyKind {
    pub fn text(self) -> &'static str {
        match self {
            ReplyKind::PoliteInsistence => {
                "Entendo sua situação, mas preciso de argumentos mais convincentes."
            }
            ReplyKind::CharityAppeal => {
                "Nobre da sua parte pensar em caridade, mas preciso de um motivo realmente excepcional."
            }
            ReplyKind::BusinessPitch => {
                "Uma ideia de negócio interessante, mas muitos antes de você já tentaram esse argumento."
            }
            ReplyKind::Unconvinced => {
                "Hmm, não estou convencida. Tente novamente com um argumento mais original e persuasivo!"
            }
        }
    }
}

/// Pick the reply for a user message
pub fn classify(text: &str) -> ReplyKind {
    let lower = text.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("por favor") && (has("preciso") || has("necessito")) {
        ReplyKind::PoliteInsistence
    } else if has("doar") && has("caridade") {
        ReplyKind::CharityAppeal
    } else if has("investir") && (has("negócio") || has("startup")) {
        ReplyKind::BusinessPitch
    } else {
        ReplyKind::Unconvinced
    }
}

/// Responder backed by [`classify`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedResponder;

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, prompt: &str) -> String {
        classify(prompt).text().to_string()
    }
}

/// Logging wrapper for responders
pub struct LoggingResponder {
    inner: Arc<dyn Responder>,
}

impl LoggingResponder {
    pub fn new(inner: Arc<dyn Responder>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Responder for LoggingResponder {
    async fn respond(&self, prompt: &str) -> String {
        let start = std::time::Instant::now();
        let reply = self.inner.respond(prompt).await;
        tracing::info!(
            duration_us = %start.elapsed().as_micros(),
            prompt_chars = prompt.chars().count(),
            reply = %reply,
            "Responder replied"
        );
        reply
    }
}
