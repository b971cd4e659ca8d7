//! Property-based tests for the transcript reducer
//!
//! These tests verify key invariants hold across arbitrary input sequences.

use super::*;
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_id() -> impl Strategy<Value = String> {
    prop_oneof![Just("t1"), Just("t2"), Just("t3")].prop_map(String::from)
}

fn arb_payload() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "[a-z ]{0,10}".prop_map(Value::String),
        (0i64..100).prop_map(|n| json!({ "n": n })),
    ]
}

fn arb_fragment() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z .]{0,8}")
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (arb_fragment(), any::<bool>())
            .prop_map(|(content, complete)| Event::Assistant { content, complete }),
        (arb_id(), "[a-z]{1,6}", arb_payload()).prop_map(|(id, name, args)| Event::ToolCall {
            id,
            name,
            args
        }),
        (arb_id(), arb_payload()).prop_map(|(id, results)| Event::ToolResult {
            id,
            name: None,
            results
        }),
        ("[a-z]{1,6}", arb_payload())
            .prop_map(|(name, args)| Event::UnkeyedToolCall { name, args }),
        arb_payload().prop_map(|results| Event::UnkeyedToolResult { results }),
        "[a-z ]{1,10}".prop_map(|content| Event::Error { content }),
        Just(Event::Status { content: None }),
        "[a-z{}]{1,10}".prop_map(|raw| Event::Unrecognized { raw }),
    ]
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        6 => arb_event().prop_map(Input::Event),
        2 => "[a-z ]{0,10}".prop_map(Input::submit),
        1 => Just(Input::Clear),
        1 => "[a-z ]{1,10}".prop_map(Input::system),
        1 => "[a-z ]{1,10}".prop_map(Input::error),
    ]
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    proptest::collection::vec(arb_input(), 0..15).prop_map(|inputs| run(inputs))
}

fn run(inputs: impl IntoIterator<Item = Input>) -> ChatState {
    inputs
        .into_iter()
        .fold(ChatState::default(), |state, input| transition(state, input).new_state)
}

// ============================================================================
// State Validity Checkers
// ============================================================================

/// Only the last message may be open, and it must be an assistant message
fn open_message_is_last(state: &ChatState) -> bool {
    !state.has_open_assistant()
        || matches!(state.transcript().last(), Some(Message::Assistant(_)))
}

/// Every pending call points at a tool-call message with its id
fn pending_calls_are_placed(state: &ChatState) -> bool {
    state.pending_tool_calls().iter().all(|(id, calls)| {
        !calls.is_empty()
            && calls.iter().all(|pending| {
                matches!(
                    state.transcript().get(pending.position),
                    Some(Message::ToolCall(call)) if &call.id == id
                )
            })
    })
}

/// Each pending entry owns a distinct message
fn pending_positions_unique(state: &ChatState) -> bool {
    let mut positions: Vec<usize> = state
        .pending_tool_calls()
        .values()
        .flatten()
        .map(|pending| pending.position)
        .collect();
    let len = positions.len();
    positions.sort_unstable();
    positions.dedup();
    positions.len() == len
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: structure holds after any input sequence
    #[test]
    fn prop_transitions_preserve_structure(inputs in proptest::collection::vec(arb_input(), 0..30)) {
        let mut state = ChatState::default();
        for input in inputs {
            state = transition(state, input).new_state;
            prop_assert!(!state.transcript().is_empty());
            prop_assert!(open_message_is_last(&state), "Open message not last: {:?}", state);
            prop_assert!(pending_calls_are_placed(&state), "Pending call misplaced: {:?}", state);
            prop_assert!(pending_positions_unique(&state), "Pending calls share a message: {:?}", state);
        }
    }

    // Invariant 2: streamed fragments concatenate into a single message
    #[test]
    fn prop_fragments_concatenate(fragments in proptest::collection::vec("[a-zA-Z ]{0,6}", 1..10)) {
        let inputs = fragments
            .iter()
            .map(|f| Input::Event(Event::fragment(f.as_str())))
            .chain(std::iter::once(Input::Event(Event::complete())));
        let state = run(inputs);

        prop_assert_eq!(state.transcript().len(), 2);
        let joined = fragments.concat();
        prop_assert_eq!(state.transcript()[1].text(), Some(joined.as_str()));
        prop_assert!(!state.has_open_assistant());
        prop_assert!(!state.is_typing());
    }

    // Invariant 3: a fragment after a seal starts a new message
    #[test]
    fn prop_fragment_after_seal_is_new_message(state in arb_state(), text in "[a-z]{1,6}") {
        let sealed = transition(state, Input::Event(Event::complete())).new_state;
        let before = sealed.transcript().len();
        let after = transition(sealed, Input::Event(Event::fragment(text.as_str()))).new_state;

        prop_assert_eq!(after.transcript().len(), before + 1);
        prop_assert_eq!(after.transcript().last().and_then(Message::text), Some(text.as_str()));
    }

    // Invariant 4: a matched tool result never changes transcript length
    #[test]
    fn prop_tool_result_merges_in_place(
        state in arb_state(),
        name in "[a-z]{1,6}",
        args in arb_payload(),
        results in arb_payload(),
        trailing in proptest::collection::vec("[a-z ]{1,6}".prop_map(Input::system), 0..3),
    ) {
        let call = Event::ToolCall { id: "fresh".to_string(), name: name.clone(), args: args.clone() };
        let mut state = transition(state, Input::Event(call)).new_state;
        let position = state.transcript().len() - 1;
        for input in trailing {
            state = transition(state, input).new_state;
        }

        let before = state.transcript().len();
        let result = Event::ToolResult { id: "fresh".to_string(), name: None, results: results.clone() };
        let out = transition(state, Input::Event(result));

        prop_assert!(out.effects.is_empty());
        prop_assert_eq!(out.new_state.transcript().len(), before);
        prop_assert_eq!(
            &out.new_state.transcript()[position],
            &Message::ToolResult(ToolCall::new("fresh", name, args).into_result(results))
        );
        prop_assert!(!out.new_state.pending_tool_calls().contains_key("fresh"));
    }

    // Invariant 5: an unknown tool result leaves the transcript alone
    #[test]
    fn prop_unmatched_tool_result_is_diagnostic(state in arb_state(), results in arb_payload()) {
        let before = state.transcript().to_vec();
        let result = Event::ToolResult { id: "nobody".to_string(), name: None, results };
        let out = transition(state, Input::Event(result));

        prop_assert_eq!(out.new_state.transcript(), before.as_slice());
        prop_assert_eq!(out.effects, vec![Effect::unmatched_tool_result("nobody")]);
    }

    // Invariant 6: blank submissions are ignored entirely
    #[test]
    fn prop_blank_submit_is_noop(state in arb_state(), blank in "[ \t\n]{0,5}") {
        let out = transition(state.clone(), Input::submit(blank));
        prop_assert_eq!(&out.new_state, &state);
        prop_assert!(out.effects.is_empty());
    }

    // Invariant 7: a submission carries the whole prior transcript as history
    #[test]
    fn prop_submit_sends_prior_history(state in arb_state(), text in "[a-z]{1,10}") {
        let prior = state.transcript().to_vec();
        let out = transition(state, Input::submit(format!("  {text} ")));

        prop_assert_eq!(out.new_state.transcript().len(), prior.len() + 1);
        prop_assert!(out.new_state.is_typing());
        match out.effects.as_slice() {
            [Effect::SendChat(request)] => {
                prop_assert_eq!(&request.content, &text);
                prop_assert_eq!(&request.history, &prior);
            }
            other => prop_assert!(false, "Expected one SendChat, got {:?}", other),
        }
    }

    // Invariant 8: clear always returns to the greeting alone
    #[test]
    fn prop_clear_resets(state in arb_state()) {
        let cleared = transition(state, Input::Clear).new_state;
        prop_assert_eq!(cleared, ChatState::default());
    }
}
