//! Pure state transition function

use super::{ChatState, Effect, Event, Input, Message, NoticeLevel, ToolCall};
use crate::wire::ChatRequest;
use serde_json::Value;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
///
/// Takes the previous state by value and returns the next one. Exactly one of
/// append, in-place merge, or no-op happens to the transcript per input, and
/// the typing flag is settled in the same step.
pub fn transition(state: ChatState, input: Input) -> TransitionResult {
    match input {
        Input::Event(event) => apply_event(state, event),
        Input::Submit { text } => submit_user_text(state, &text),
        Input::Clear => TransitionResult::new(state.reset()),
        Input::Notice { level, text } => apply_notice(state, level, text),
    }
}

fn apply_event(mut state: ChatState, event: Event) -> TransitionResult {
    match event {
        // ============================================================
        // Streamed assistant output
        // ============================================================
        Event::Assistant {
            content,
            complete: false,
        } => {
            state.append_fragment(content.as_deref().unwrap_or_default());
            state.typing = true;
            TransitionResult::new(state)
        }

        // Completion may carry one last fragment; append it before sealing
        Event::Assistant {
            content,
            complete: true,
        } => {
            if let Some(fragment) = content.filter(|c| !c.is_empty()) {
                state.append_fragment(&fragment);
            }
            state.seal_assistant();
            state.typing = false;
            TransitionResult::new(state)
        }

        // ============================================================
        // Tool lifecycle
        // ============================================================
        Event::ToolCall { id, name, args } => {
            state.push_tool_call(ToolCall::new(id, name, args));
            state.typing = false;
            TransitionResult::new(state)
        }

        Event::ToolResult { id, results, .. } => merge_tool_result(state, id, &results),

        // Id-less tools pair up by arrival order
        Event::UnkeyedToolCall { name, args } => {
            state.push_unkeyed_tool_call(name, args);
            state.typing = false;
            TransitionResult::new(state)
        }

        Event::UnkeyedToolResult { results } => {
            state.merge_unkeyed_tool_result(results);
            state.typing = false;
            TransitionResult::new(state)
        }

        // ============================================================
        // Errors, status, fallback
        // ============================================================
        Event::Error { content } => {
            state.push(Message::Error(content));
            state.typing = false;
            TransitionResult::new(state)
        }

        Event::Status { .. } => TransitionResult::new(state),

        Event::Unrecognized { raw } => {
            state.push(Message::Assistant(raw.clone()));
            state.typing = false;
            TransitionResult::new(state).with_effect(Effect::unrecognized_payload(raw))
        }
    }
}

fn merge_tool_result(mut state: ChatState, id: String, results: &Value) -> TransitionResult {
    state.typing = false;
    if state.merge_tool_result(&id, results) {
        TransitionResult::new(state)
    } else {
        TransitionResult::new(state).with_effect(Effect::unmatched_tool_result(id))
    }
}

fn submit_user_text(mut state: ChatState, text: &str) -> TransitionResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return TransitionResult::new(state);
    }

    let history = state.transcript.clone();
    state.push(Message::User(trimmed.to_string()));
    state.typing = true;

    TransitionResult::new(state).with_effect(Effect::SendChat(ChatRequest::new(trimmed, history)))
}

fn apply_notice(mut state: ChatState, level: NoticeLevel, text: String) -> TransitionResult {
    match level {
        NoticeLevel::System => state.push(Message::System(text)),
        NoticeLevel::Error => {
            state.push(Message::Error(text));
            state.typing = false;
        }
    }
    TransitionResult::new(state)
}
