//! WebSocket connection provider
//!
//! Owns the socket. Inbound frames are forwarded in arrival order as
//! [`ConnectionSignal`]s; outbound payloads go through a queue drained by a
//! writer task. There is no reconnect: once closed, sends fail.

use crate::runtime::{Connection, ConnectionSignal};
use crate::wire::ChatRequest;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message as WsMessage};

const OUTBOUND_QUEUE: usize = 32;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("connection closed")]
    Closed,
}

/// Client side of the chat socket
pub struct WsConnection {
    outbound_tx: mpsc::Sender<WsMessage>,
}

impl WsConnection {
    /// Start connecting to `url` in the background.
    ///
    /// `Connected` is signalled once the handshake completes; a failed
    /// handshake is signalled as `Failed` followed by `Closed`.
    pub fn spawn(url: impl Into<String>, signal_tx: mpsc::Sender<ConnectionSignal>) -> Self {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);

        tokio::spawn(async move {
            if let Err(e) = run_socket(&url, outbound_rx, &signal_tx).await {
                tracing::error!(url = %url, error = %e, "WebSocket connection failed");
                let _ = signal_tx.send(ConnectionSignal::Failed(e.to_string())).await;
            }
            let _ = signal_tx.send(ConnectionSignal::Closed).await;
        });

        Self { outbound_tx }
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&self, request: &ChatRequest) -> Result<(), ConnectionError> {
        let json = request.to_json()?;
        self.outbound_tx
            .send(WsMessage::Text(json))
            .await
            .map_err(|_| ConnectionError::Closed)
    }
}

/// Connect, then pump frames both ways until either side ends
async fn run_socket(
    url: &str,
    mut outbound_rx: mpsc::Receiver<WsMessage>,
    signal_tx: &mpsc::Sender<ConnectionSignal>,
) -> Result<(), ConnectionError> {
    let (stream, _) = connect_async(url).await?;
    tracing::info!(url = %url, "WebSocket connected");
    let (mut write, mut read) = stream.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = write.send(message).await {
                tracing::warn!(error = %e, "WebSocket write failed");
                break;
            }
        }
        let _ = write.close().await;
    });

    if signal_tx.send(ConnectionSignal::Connected).await.is_err() {
        writer.abort();
        return Ok(());
    }

    let mut outcome = Ok(());
    while let Some(result) = read.next().await {
        let text = match result {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(WsMessage::Close(frame)) => {
                tracing::info!(?frame, "WebSocket closed by server");
                break;
            }
            // pings are answered by tungstenite itself
            Ok(_) => continue,
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        };
        if signal_tx.send(ConnectionSignal::Frame(text)).await.is_err() {
            break;
        }
    }

    writer.abort();
    outcome
}
