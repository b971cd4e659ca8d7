//! Chat transcript reducer
//!
//! Folds inbound protocol events and user actions into an ordered transcript
//! of display messages. Transitions are pure: the old state goes in by value,
//! the new state and a list of effects come out.

mod effect;
pub mod event;
pub mod message;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Diagnostic, Effect};
pub use event::{Event, Input, NoticeLevel};
pub use message::{Message, MessageKind, ToolCall};
pub use state::{ChatState, DEFAULT_GREETING, UNKNOWN_TOOL};
pub use transition::transition;
