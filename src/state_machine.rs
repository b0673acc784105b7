//! Dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in, applies the returned session and executes
//! the returned effects.

mod effect;
pub mod event;
pub mod keyboard;
pub(crate) mod messages;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reply, TextFormat};
pub use event::{Action, Event};
pub use keyboard::Keyboard;
pub use state::{DialogueContext, DialogueState, Session};
pub use transition::transition;
