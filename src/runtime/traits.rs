//! Trait abstractions for runtime I/O
//!
//! These traits let the executor run against mock implementations in tests.

use crate::connection::ConnectionError;
use crate::transcript::ChatState;
use crate::wire::ChatRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound half of the chat connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Queue a chat payload for transmission
    async fn send(&self, request: &ChatRequest) -> Result<(), ConnectionError>;
}

/// Consumer of state snapshots
pub trait Renderer: Send {
    /// Called once per transition with the complete new state
    fn render(&mut self, state: &ChatState);

    /// Flip the expanded/collapsed display of the message at `index`
    fn toggle_expanded(&mut self, index: usize, state: &ChatState);
}

#[async_trait]
impl<T: Connection + ?Sized> Connection for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<(), ConnectionError> {
        (**self).send(request).await
    }
}
