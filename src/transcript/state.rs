//! Transcript state

use super::message::{Message, MessageKind, ToolCall};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// Greeting seeded into every fresh transcript
pub const DEFAULT_GREETING: &str = "Hi there! I'm an AI assistant. How can I help you today?";

/// Name shown for a tool whose name never arrived
pub const UNKNOWN_TOOL: &str = "unknown";

/// Generated ids for calls announced without one
const UNKEYED_ID_PREFIX: &str = "call-";

/// A tool call waiting for its results, with the transcript position of its message
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolCall {
    pub call: ToolCall,
    pub position: usize,
}

/// Everything the reducer owns.
///
/// The transcript is append-only except for two mutations: streamed text
/// appended to the open assistant message (always the last entry), and a
/// tool-call converted to a tool-result at its original position.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    greeting: String,
    pub(super) transcript: Vec<Message>,
    pub(super) typing: bool,
    pub(super) pending: HashMap<String, Vec<PendingToolCall>>,
    /// Generated ids of id-less calls still waiting, oldest first
    unkeyed_pending: VecDeque<String>,
    unkeyed_calls: usize,
    /// The last message is an assistant message still receiving fragments
    pub(super) open_assistant: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

impl ChatState {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            transcript: vec![Message::Assistant(greeting.clone())],
            greeting,
            typing: false,
            pending: HashMap::new(),
            unkeyed_pending: VecDeque::new(),
            unkeyed_calls: 0,
            open_assistant: false,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn pending_tool_calls(&self) -> &HashMap<String, Vec<PendingToolCall>> {
        &self.pending
    }

    pub fn has_open_assistant(&self) -> bool {
        self.open_assistant
    }

    /// Back to a single greeting, nothing pending, not typing
    pub(super) fn reset(self) -> Self {
        Self::new(self.greeting)
    }

    /// Append a sealed message. Seals any open assistant message.
    pub(super) fn push(&mut self, message: Message) {
        self.open_assistant = false;
        self.transcript.push(message);
    }

    /// Append streamed text to the open assistant message, opening one if needed
    pub(super) fn append_fragment(&mut self, fragment: &str) {
        if self.open_assistant {
            if let Some(Message::Assistant(text)) = self.transcript.last_mut() {
                text.push_str(fragment);
                return;
            }
        }
        self.transcript.push(Message::Assistant(fragment.to_string()));
        self.open_assistant = true;
    }

    pub(super) fn seal_assistant(&mut self) {
        self.open_assistant = false;
    }

    /// Record a tool call and append its message.
    ///
    /// An id may be announced more than once; every call under it stays pending.
    pub(super) fn push_tool_call(&mut self, call: ToolCall) {
        let position = self.transcript.len();
        self.pending
            .entry(call.id.clone())
            .or_default()
            .push(PendingToolCall {
                call: call.clone(),
                position,
            });
        self.push(Message::ToolCall(call));
    }

    /// Record a call that arrived without an id under a generated one
    pub(super) fn push_unkeyed_tool_call(&mut self, name: String, args: Value) {
        self.unkeyed_calls += 1;
        let id = format!("{UNKEYED_ID_PREFIX}{}", self.unkeyed_calls);
        self.unkeyed_pending.push_back(id.clone());
        self.push_tool_call(ToolCall::new(id, name, args));
    }

    /// Convert every pending call under `id` in place.
    ///
    /// Returns false when no pending call matches; the transcript is untouched then.
    pub(super) fn merge_tool_result(&mut self, id: &str, results: &Value) -> bool {
        let Some(calls) = self.pending.remove(id) else {
            return false;
        };
        let mut merged = false;
        for pending in calls {
            let Some(slot) = self.transcript.get_mut(pending.position) else {
                continue;
            };
            if slot.kind() != MessageKind::ToolCall || slot.tool_id() != Some(id) {
                continue;
            }
            *slot = Message::ToolResult(pending.call.into_result(results.clone()));
            merged = true;
        }
        merged
    }

    /// Pair id-less results with id-less calls in arrival order.
    ///
    /// With nothing left to pair, the result is appended on its own.
    pub(super) fn merge_unkeyed_tool_result(&mut self, results: Value) {
        while let Some(id) = self.unkeyed_pending.pop_front() {
            if self.merge_tool_result(&id, &results) {
                return;
            }
        }
        self.unkeyed_calls += 1;
        let id = format!("{UNKEYED_ID_PREFIX}{}", self.unkeyed_calls);
        self.push(Message::ToolResult(
            ToolCall::new(id, UNKNOWN_TOOL, Value::Null).into_result(results),
        ));
    }
}
