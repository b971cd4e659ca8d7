//! Chat runtime executor

use super::traits::{Connection, Renderer};
use super::ConnectionSignal;
use crate::input::UserCommand;
use crate::transcript::{transition, ChatState, Diagnostic, Effect, Input};
use crate::wire::{decode_event, Protocol};
use tokio::sync::mpsc;

/// Longest slice of an unrecognized payload that goes into the log
const LOGGED_PAYLOAD_CHARS: usize = 200;

/// Owns the chat state and drives it from connection signals and user commands
pub struct ChatRuntime<C, R>
where
    C: Connection,
    R: Renderer,
{
    state: ChatState,
    protocol: Protocol,
    connection: C,
    renderer: R,
    signal_rx: mpsc::Receiver<ConnectionSignal>,
    command_rx: mpsc::Receiver<UserCommand>,
    connected: bool,
}

impl<C, R> ChatRuntime<C, R>
where
    C: Connection,
    R: Renderer,
{
    pub fn new(
        state: ChatState,
        protocol: Protocol,
        connection: C,
        renderer: R,
        signal_rx: mpsc::Receiver<ConnectionSignal>,
        command_rx: mpsc::Receiver<UserCommand>,
    ) -> Self {
        Self {
            state,
            protocol,
            connection,
            renderer,
            signal_rx,
            command_rx,
            connected: false,
        }
    }

    /// Process signals and commands until the user quits or both channels close.
    /// Returns the final state.
    pub async fn run(mut self) -> ChatState {
        tracing::info!(protocol = %self.protocol, "Starting chat runtime");
        self.renderer.render(&self.state);

        loop {
            tokio::select! {
                // Inbound frames first, so a queued quit never skips delivered output
                biased;
                Some(signal) = self.signal_rx.recv() => {
                    self.handle_signal(signal).await;
                }
                Some(command) = self.command_rx.recv() => {
                    if matches!(command, UserCommand::Quit) {
                        break;
                    }
                    self.handle_command(command).await;
                }
                else => break,
            }
        }

        tracing::info!(
            messages = self.state.transcript().len(),
            pending_tools = self.state.pending_tool_calls().len(),
            "Chat runtime stopped"
        );
        self.state
    }

    async fn handle_signal(&mut self, signal: ConnectionSignal) {
        let input = match signal {
            ConnectionSignal::Connected => {
                self.connected = true;
                Input::system("WebSocket connected")
            }
            ConnectionSignal::Frame(text) => {
                let event = decode_event(&text, self.protocol);
                tracing::debug!(event = event.name(), "Inbound event");
                Input::Event(event)
            }
            ConnectionSignal::Closed => {
                self.connected = false;
                Input::system("WebSocket closed")
            }
            ConnectionSignal::Failed(message) => {
                self.connected = false;
                tracing::error!(error = %message, "Connection failed");
                Input::error(format!("WebSocket error: {message}"))
            }
        };
        self.apply(input).await;
    }

    async fn handle_command(&mut self, command: UserCommand) {
        match command {
            UserCommand::Submit(text) => {
                if !self.connected && !text.trim().is_empty() {
                    tracing::warn!("Submission while disconnected");
                    self.apply(Input::error("Not connected")).await;
                } else {
                    self.apply(Input::Submit { text }).await;
                }
            }
            UserCommand::Clear => self.apply(Input::Clear).await,
            UserCommand::ToggleExpand(index) => {
                self.renderer.toggle_expanded(index, &self.state);
            }
            UserCommand::Quit => {}
        }
    }

    /// Run one input through the reducer, then its effects.
    /// Effects can yield follow-up inputs; those are applied the same way.
    async fn apply(&mut self, input: Input) {
        let mut inputs = vec![input];

        while let Some(current) = inputs.pop() {
            let state = std::mem::take(&mut self.state);
            let result = transition(state, current);
            self.state = result.new_state;
            self.renderer.render(&self.state);

            for effect in result.effects {
                if let Some(follow_up) = self.execute_effect(effect).await {
                    inputs.push(follow_up);
                }
            }
        }
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Input> {
        match effect {
            Effect::SendChat(request) => {
                tracing::debug!(
                    chars = request.content.len(),
                    history = request.history.len(),
                    "Sending chat message"
                );
                match self.connection.send(&request).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to send chat message");
                        Some(Input::error(format!("Failed to send message: {e}")))
                    }
                }
            }
            Effect::Diagnostic(Diagnostic::UnmatchedToolResult { id }) => {
                tracing::warn!(tool_id = %id, "Dropping tool result with no pending call");
                None
            }
            Effect::Diagnostic(Diagnostic::UnrecognizedPayload { raw }) => {
                let preview: String = raw.chars().take(LOGGED_PAYLOAD_CHARS).collect();
                tracing::warn!(payload = %preview, "Unrecognized payload shown as text");
                None
            }
        }
    }
}
