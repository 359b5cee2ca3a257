//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, Notice, NoticeVariant, PAYMENT_COMPLETED};
pub use event::Event;
pub use state::{ConvContext, ConvState, Gate, ReplyTicket};
pub use transition::transition;
