//! MCP transport layer implementations.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::mcp::protocol::{
    error_codes, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};

/// A message that can be sent or received.
#[derive(Debug, Clone)]
pub enum Message {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

/// Transport trait for MCP communication.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start the transport, returning channels for messages.
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)>;

    /// Stop the transport.
    async fn stop(&mut self) -> Result<()>;
}

/// Outcome of decoding one line from the wire.
#[derive(Debug)]
pub enum Decoded {
    /// A well-formed message for the server.
    Message(Message),
    /// Valid JSON carrying an id, but not a request. Answered directly.
    Reply(JsonRpcResponse),
    /// Nothing to do.
    Skip,
}

/// Decode a single newline-delimited JSON-RPC frame.
pub fn decode_line(line: &str) -> Decoded {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Decoded::Skip;
    }

    // Try to parse as request first, then notification
    if let Ok(req) = serde_json::from_str::<JsonRpcRequest>(trimmed) {
        return Decoded::Message(Message::Request(req));
    }
    if let Ok(notif) = serde_json::from_str::<JsonRpcNotification>(trimmed) {
        return Decoded::Message(Message::Notification(notif));
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if value.get("result").is_some() || value.get("error").is_some() => {
            // The server never issues requests, so client responses go nowhere.
            debug!("Ignoring response from client: {}", trimmed);
            Decoded::Skip
        }
        Ok(value) => {
            let id = value
                .get("id")
                .cloned()
                .and_then(|id| serde_json::from_value::<RequestId>(id).ok());
            match id {
                Some(id) => {
                    warn!("Invalid request with id {:?}", id);
                    Decoded::Reply(JsonRpcResponse::failure(
                        id,
                        error_codes::INVALID_REQUEST,
                        "Invalid request",
                    ))
                }
                None => {
                    error!("Ignoring malformed message: {}", trimmed);
                    Decoded::Skip
                }
            }
        }
        Err(e) => {
            error!("Failed to parse message: {} ({})", trimmed, e);
            Decoded::Skip
        }
    }
}

/// Stdio transport for MCP.
///
/// Responses still queued when stdin closes are written out before
/// [`Transport::stop`] returns.
pub struct StdioTransport {
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new() -> Self {
        Self {
            reader: None,
            writer: None,
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)> {
        let (incoming_tx, incoming_rx) = mpsc::channel::<Message>(100);
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(100);

        // stdin reader
        let tx = incoming_tx.clone();
        let reply_tx = outgoing_tx.clone();
        let reader = tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!("EOF on stdin, stopping transport");
                        break;
                    }
                    Ok(_) => {
                        trace!("Received: {}", line.trim());
                        match decode_line(&line) {
                            Decoded::Message(msg) => {
                                if tx.send(msg).await.is_err() {
                                    break;
                                }
                            }
                            Decoded::Reply(response) => {
                                if reply_tx.send(Message::Response(response)).await.is_err() {
                                    break;
                                }
                            }
                            Decoded::Skip => {}
                        }
                    }
                    Err(e) => {
                        error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        // stdout writer
        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();

            while let Some(msg) = outgoing_rx.recv().await {
                let json = match &msg {
                    Message::Request(req) => serde_json::to_string(req),
                    Message::Response(res) => serde_json::to_string(res),
                    Message::Notification(notif) => serde_json::to_string(notif),
                };

                match json {
                    Ok(s) => {
                        trace!("Sending: {}", s);
                        if let Err(e) = stdout.write_all(s.as_bytes()).await {
                            error!("Error writing to stdout: {}", e);
                            break;
                        }
                        if let Err(e) = stdout.write_all(b"\n").await {
                            error!("Error writing newline: {}", e);
                            break;
                        }
                        if let Err(e) = stdout.flush().await {
                            error!("Error flushing stdout: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error serializing message: {}", e);
                    }
                }
            }
        });

        self.reader = Some(reader);
        self.writer = Some(writer);
        Ok((incoming_rx, outgoing_tx))
    }

    /// Wait for the writer to flush everything queued. Callers must drop
    /// their outgoing sender first or this never returns.
    async fn stop(&mut self) -> Result<()> {
        // The reader holds a sender for invalid-request replies.
        if let Some(reader) = self.reader.take() {
            reader.abort();
            let _ = reader.await;
        }
        if let Some(writer) = self.writer.take() {
            writer
                .await
                .map_err(|e| Error::Internal(format!("stdout writer failed: {}", e)))?;
        }
        Ok(())
    }
}
