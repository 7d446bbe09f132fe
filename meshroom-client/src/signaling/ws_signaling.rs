use crate::error::ClientError;
use crate::signaling::SignalingSink;
use futures::{SinkExt, StreamExt};
use meshroom_core::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

/// Cloneable handle that queues frames for the writer task.
#[derive(Clone)]
pub struct WsSignaling {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalingSink for WsSignaling {
    fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        self.tx.send(msg).map_err(|_| ClientError::SignalingClosed)
    }
}

/// WebSocket connection to the signaling server, split into a writer and a
/// reader task.
pub struct SignalingConnection {
    sink: Arc<WsSignaling>,
    incoming: mpsc::UnboundedReceiver<ServerMessage>,
    shutdown: Option<oneshot::Sender<()>>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl SignalingConnection {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws_stream, _) = connect_async(url).await?;
        debug!("Connected to signaling server at {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    msg = out_rx.recv() => {
                        let Some(msg) = msg else { break };
                        let json = match serde_json::to_string(&msg) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("Failed to serialize client message: {}", e);
                                continue;
                            }
                        };
                        if write.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
            let _ = write.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if in_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid ServerMessage: {:?}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Signaling socket error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            sink: Arc::new(WsSignaling { tx: out_tx }),
            incoming: in_rx,
            shutdown: Some(shutdown_tx),
            writer,
            reader,
        })
    }

    pub fn sink(&self) -> Arc<WsSignaling> {
        Arc::clone(&self.sink)
    }

    /// Next frame from the server; `None` once the socket is gone.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.incoming.recv().await
    }

    /// Sends a close frame and waits for the writer to finish.
    pub async fn close(mut self) -> Result<(), ClientError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.reader.abort();
        self.writer.await?;
        Ok(())
    }
}
