//! Runtime that owns the chat state
//!
//! Connection signals and user commands arrive on channels; each one becomes a
//! single reducer transition, after which the renderer sees the whole new
//! state and the transition's effects run against the connection.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use traits::*;

/// Out-of-band signals from the connection provider, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionSignal {
    Connected,
    /// One inbound text frame, not yet decoded
    Frame(String),
    Closed,
    Failed(String),
}
