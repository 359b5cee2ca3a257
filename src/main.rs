//! Convince the AI - persuasion chat demo
//!
//! A terminal host surface driving one in-memory conversation session with a
//! scripted responder and a simulated payment gate.

mod config;
mod console;
mod counters;
mod host;
mod responder;
mod runtime;
mod state_machine;
mod store;

use config::SessionConfig;
use console::{Command, Renderer};
use host::CountersHost;
use runtime::{start_production_session, SessionEvent};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout is the chat itself
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convince_ai=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = SessionConfig::from_env()?;
    tracing::info!(
        reply_delay_ms = %config.reply_delay.as_millis(),
        initial_prize = config.initial_prize,
        initial_failed_attempts = config.initial_failed_attempts,
        "Starting session"
    );

    let host = Arc::new(CountersHost::new(config.initial_counters()));
    let mut counters_rx = host.subscribe();
    let session = start_production_session(&config, host.clone());
    let mut events = session.subscribe();

    println!("{}\n{}\n", console::TITLE, console::SUBTITLE);
    println!("{}", console::prize_display(&host.counters()));
    for entry in session.transcript().await {
        println!("{}", console::render_entry(&entry));
    }
    let mut renderer = Renderer::from_state(&session.state());
    println!("({})", console::input_placeholder(host.counters().unlocked));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Command::Say(text) => session.submit(text).await?,
                    Command::Pay => session.payment_succeeded().await?,
                    Command::Status => println!("{}", console::prize_display(&host.counters())),
                    Command::Help => println!("{}", console::HELP),
                    Command::Quit => break,
                }
            }

            event = events.recv() => match event {
                Ok(SessionEvent::Message { message }) => {
                    // The user already sees what they typed
                    if message.sender == store::Sender::Responder {
                        println!("{}", console::render_message(&message));
                    }
                }
                Ok(SessionEvent::StateChange { state }) => {
                    for line in renderer.on_state(&state) {
                        println!("{line}");
                    }
                }
                Ok(SessionEvent::Notice { notice }) => {
                    println!("{}", console::render_notice(&notice));
                }
                Ok(SessionEvent::Error { message }) => {
                    tracing::warn!(error = %message, "Session reported an error");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind session events");
                }
                Err(RecvError::Closed) => break,
            },

            Ok(()) = counters_rx.changed() => {
                let counters = *counters_rx.borrow_and_update();
                println!("{}", console::prize_display(&counters));
                println!("({})", console::input_placeholder(counters.unlocked));
            }
        }
    }

    session.shutdown();
    println!("\n{}", console::FOOTER);
    Ok(())
}
