//! Transcript message types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A tool invocation announced by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// A tool invocation merged with its results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub id: String,
    pub name: String,
    pub args: Value,
    pub results: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Merge results into this call, keeping the original name and args
    pub fn into_result(self, results: Value) -> ToolResult {
        ToolResult {
            id: self.id,
            name: self.name,
            args: self.args,
            results,
        }
    }
}

/// One entry in the transcript.
///
/// Serializes as `{"type": <kind>, "content": <content>}`, which is also the
/// shape of a `history` entry in the outbound chat payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum Message {
    User(String),
    Assistant(String),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    Error(String),
    System(String),
}

/// Discriminant of [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    User,
    Assistant,
    ToolCall,
    ToolResult,
    Error,
    System,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Assistant => "assistant",
            MessageKind::ToolCall => "tool-call",
            MessageKind::ToolResult => "tool-result",
            MessageKind::Error => "error",
            MessageKind::System => "system",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::User(_) => MessageKind::User,
            Message::Assistant(_) => MessageKind::Assistant,
            Message::ToolCall(_) => MessageKind::ToolCall,
            Message::ToolResult(_) => MessageKind::ToolResult,
            Message::Error(_) => MessageKind::Error,
            Message::System(_) => MessageKind::System,
        }
    }

    /// Text content, for the text-bearing kinds
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::User(text)
            | Message::Assistant(text)
            | Message::Error(text)
            | Message::System(text) => Some(text),
            Message::ToolCall(_) | Message::ToolResult(_) => None,
        }
    }

    /// Id of the tool invocation this message describes, if any
    pub fn tool_id(&self) -> Option<&str> {
        match self {
            Message::ToolCall(call) => Some(&call.id),
            Message::ToolResult(result) => Some(&result.id),
            _ => None,
        }
    }
}
