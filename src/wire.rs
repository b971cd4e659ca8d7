//! JSON envelope exchanged over the chat socket
//!
//! Inbound frames decode into transcript [`Event`]s; decoding never fails,
//! anything unusable becomes [`Event::Unrecognized`] carrying the raw text.
//! The outbound side is a single `chat` payload.

use crate::transcript::{Event, Message, UNKNOWN_TOOL};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Outbound
// ============================================================================

/// Chat payload sent when the user submits text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "chat")]
pub struct ChatRequest {
    pub content: String,
    /// Transcript as it was before this submission, as `{type, content}` entries
    pub history: Vec<Message>,
}

impl ChatRequest {
    pub fn new(content: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            content: content.into(),
            history,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// Protocol variants
// ============================================================================

/// Event vocabulary spoken by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// `assistant` (with `complete`), unified `tool`, `error`, `status`
    #[default]
    Canonical,
    /// Canonical plus `tool_call`, `tool_result` and `final_response`
    Legacy,
}

#[derive(Debug, Error)]
#[error("unknown protocol '{0}' (expected 'canonical' or 'legacy')")]
pub struct UnknownProtocol(String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(Protocol::Canonical),
            "legacy" => Ok(Protocol::Legacy),
            other => Err(UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Canonical => f.write_str("canonical"),
            Protocol::Legacy => f.write_str("legacy"),
        }
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Deserialize a field that may be present with any value, including `null`.
/// Combined with `#[serde(default)]` a missing field stays `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        complete: bool,
    },
    Tool {
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "present")]
        args: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        results: Option<Value>,
    },
    Error {
        content: String,
    },
    Status {
        #[serde(default)]
        content: Option<Value>,
    },
    // Legacy vocabulary
    FinalResponse {
        #[serde(default)]
        #[allow(dead_code)] // full response body, superseded by the streamed text
        content: Option<Value>,
    },
    ToolCall {
        content: LegacyTool,
    },
    ToolResult {
        #[serde(default, deserialize_with = "present")]
        content: Option<Value>,
    },
}

/// Tool record nested under `content` in the legacy vocabulary.
/// Older servers leave out the id, and send results as the bare `content`.
#[derive(Debug, Deserialize)]
struct LegacyTool {
    #[serde(default, alias = "tool_call_id")]
    id: Option<String>,
    #[serde(default, alias = "tool_name")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    args: Option<Value>,
    #[serde(default, alias = "content", deserialize_with = "present")]
    results: Option<Value>,
}

/// Decode one inbound frame
pub fn decode_event(raw: &str, protocol: Protocol) -> Event {
    let unrecognized = || Event::Unrecognized {
        raw: raw.to_string(),
    };

    let Ok(envelope) = serde_json::from_str::<Envelope>(raw) else {
        return unrecognized();
    };

    match envelope {
        Envelope::Assistant { content, complete } => Event::Assistant { content, complete },

        Envelope::Tool {
            id,
            name,
            args,
            results,
        } => match (results, args) {
            (Some(results), _) => Event::ToolResult { id, name, results },
            (None, Some(args)) => Event::ToolCall {
                id,
                name: name.unwrap_or_else(|| UNKNOWN_TOOL.to_string()),
                args,
            },
            (None, None) => unrecognized(),
        },

        Envelope::Error { content } => Event::Error { content },
        Envelope::Status { content } => Event::Status { content },

        Envelope::FinalResponse { .. } if protocol == Protocol::Legacy => Event::complete(),

        Envelope::ToolCall { content } if protocol == Protocol::Legacy => {
            let name = content.name.unwrap_or_else(|| UNKNOWN_TOOL.to_string());
            let args = content.args.unwrap_or(Value::Null);
            match content.id {
                Some(id) => Event::ToolCall { id, name, args },
                None => Event::UnkeyedToolCall { name, args },
            }
        }

        Envelope::ToolResult { content } if protocol == Protocol::Legacy => {
            legacy_tool_result(content.unwrap_or(Value::Null))
        }

        Envelope::FinalResponse { .. }
        | Envelope::ToolCall { .. }
        | Envelope::ToolResult { .. } => unrecognized(),
    }
}

/// A legacy result is either a keyed record or the bare results
fn legacy_tool_result(content: Value) -> Event {
    let keyed = content.is_object()
        && (content.get("id").is_some_and(Value::is_string)
            || content.get("tool_call_id").is_some_and(Value::is_string));
    if keyed {
        if let Ok(LegacyTool {
            id: Some(id),
            name,
            results,
            ..
        }) = serde_json::from_value::<LegacyTool>(content.clone())
        {
            return Event::ToolResult {
                id,
                name,
                results: results.unwrap_or(Value::Null),
            };
        }
    }
    Event::UnkeyedToolResult { results: content }
}
