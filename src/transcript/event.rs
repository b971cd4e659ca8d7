//! Inputs that drive transcript transitions

use serde_json::Value;

/// A decoded inbound protocol event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Streamed assistant output; `complete` seals the open message
    Assistant {
        content: Option<String>,
        complete: bool,
    },
    /// Tool invocation announced
    ToolCall {
        id: String,
        name: String,
        args: Value,
    },
    /// Results for a previously announced invocation
    ToolResult {
        id: String,
        name: Option<String>,
        results: Value,
    },
    /// Tool invocation announced without an id
    UnkeyedToolCall {
        name: String,
        args: Value,
    },
    /// Results without an id, for the oldest id-less invocation still waiting
    UnkeyedToolResult {
        results: Value,
    },
    Error {
        content: String,
    },
    /// Liveness signal, no transcript effect
    Status {
        content: Option<Value>,
    },
    /// Anything that could not be decoded; shown verbatim
    Unrecognized {
        raw: String,
    },
}

impl Event {
    pub fn fragment(content: impl Into<String>) -> Self {
        Event::Assistant {
            content: Some(content.into()),
            complete: false,
        }
    }

    pub fn complete() -> Self {
        Event::Assistant {
            content: None,
            complete: true,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Event::Assistant { .. } => "assistant",
            Event::ToolCall { .. } => "tool_call",
            Event::ToolResult { .. } => "tool_result",
            Event::UnkeyedToolCall { .. } => "unkeyed_tool_call",
            Event::UnkeyedToolResult { .. } => "unkeyed_tool_result",
            Event::Error { .. } => "error",
            Event::Status { .. } => "status",
            Event::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// Severity of a host-originated notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    System,
    Error,
}

/// Everything the reducer accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Inbound protocol event
    Event(Event),
    /// User submitted text
    Submit { text: String },
    /// User cleared the conversation
    Clear,
    /// Connection-level signal surfaced by the host
    Notice { level: NoticeLevel, text: String },
}

impl From<Event> for Input {
    fn from(event: Event) -> Self {
        Input::Event(event)
    }
}

impl Input {
    pub fn submit(text: impl Into<String>) -> Self {
        Input::Submit { text: text.into() }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Input::Notice {
            level: NoticeLevel::System,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Input::Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
