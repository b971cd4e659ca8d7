//! Chat Transcript - terminal client for a streaming chat agent
//!
//! Connects to the agent over a WebSocket, folds its event stream into a
//! transcript, and redraws the transcript in the terminal.

mod config;
mod connection;
mod input;
mod render;
mod runtime;
mod transcript;
mod wire;

use config::ClientConfig;
use connection::WsConnection;
use render::TerminalRenderer;
use runtime::ChatRuntime;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcript::ChatState;

const CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_transcript=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        url = %config.ws_url,
        protocol = %config.protocol,
        color = config.color,
        "Configuration loaded"
    );

    let (signal_tx, signal_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let connection = WsConnection::spawn(config.ws_url.clone(), signal_tx);
    let _stdin = input::spawn_stdin_reader(command_tx);
    let renderer = TerminalRenderer::new(std::io::stdout(), config.color);

    let runtime = ChatRuntime::new(
        ChatState::new(config.greeting),
        config.protocol,
        connection,
        renderer,
        signal_rx,
        command_rx,
    );
    let final_state = runtime.run().await;

    tracing::info!(messages = final_state.transcript().len(), "Shutting down");
    Ok(())
}
