//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real socket or terminal.

use super::traits::{Connection, Renderer};
use crate::connection::ConnectionError;
use crate::transcript::ChatState;
use crate::wire::ChatRequest;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Connection
// ============================================================================

/// Records every payload it is asked to send
#[derive(Default)]
pub struct MockConnection {
    sent: Mutex<Vec<ChatRequest>>,
    fail: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection whose sends always fail as if the socket had closed
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<ChatRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn send(&self, request: &ChatRequest) -> Result<(), ConnectionError> {
        if self.fail {
            return Err(ConnectionError::Closed);
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }
}

// ============================================================================
// Recording Renderer
// ============================================================================

/// Keeps a copy of every state it was shown; clones share the same record
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<ChatState>>>,
    toggled: Arc<Mutex<Vec<usize>>>,
}

impl RecordingRenderer {
    pub fn frames(&self) -> Vec<ChatState> {
        self.frames.lock().unwrap().clone()
    }

    pub fn toggled(&self) -> Vec<usize> {
        self.toggled.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, state: &ChatState) {
        self.frames.lock().unwrap().push(state.clone());
    }

    fn toggle_expanded(&mut self, index: usize, _state: &ChatState) {
        self.toggled.lock().unwrap().push(index);
    }
}
