//! Effects produced by transcript transitions

use crate::wire::ChatRequest;

/// Something the reducer noticed but deliberately kept out of the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A tool result arrived for an id with no pending call
    UnmatchedToolResult { id: String },
    /// An inbound payload fell back to verbatim display
    UnrecognizedPayload { raw: String },
}

/// Effects to be executed by the runtime after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Transmit a chat payload over the connection
    SendChat(ChatRequest),

    /// Report a diagnostic (logged, never displayed)
    Diagnostic(Diagnostic),
}

impl Effect {
    pub fn unmatched_tool_result(id: impl Into<String>) -> Self {
        Effect::Diagnostic(Diagnostic::UnmatchedToolResult { id: id.into() })
    }

    pub fn unrecognized_payload(raw: impl Into<String>) -> Self {
        Effect::Diagnostic(Diagnostic::UnrecognizedPayload { raw: raw.into() })
    }
}
