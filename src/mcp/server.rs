//! MCP server implementation.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::*;
use crate::mcp::transport::{Message, Transport};
use crate::VERSION;

/// MCP server.
pub struct McpServer {
    handler: Arc<McpHandler>,
    name: String,
    version: String,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(handler: McpHandler, name: impl Into<String>) -> Self {
        Self {
            handler: Arc::new(handler),
            name: name.into(),
            version: VERSION.to_string(),
        }
    }

    /// The tool registry backing this server.
    pub fn handler(&self) -> Arc<McpHandler> {
        self.handler.clone()
    }

    /// Server identity reported during `initialize`.
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }

    /// Run the server with the given transport until the peer hangs up.
    pub async fn run<T: Transport>(&self, mut transport: T) -> Result<()> {
        info!("Starting MCP server: {} v{}", self.name, self.version);

        let (mut incoming, outgoing) = transport.start().await?;

        while let Some(msg) = incoming.recv().await {
            match msg {
                Message::Request(req) => {
                    let response = self.handle_request(req).await;
                    if outgoing.send(Message::Response(response)).await.is_err() {
                        error!("Failed to send response");
                        break;
                    }
                }
                Message::Notification(notif) => {
                    self.handle_notification(notif).await;
                }
                Message::Response(_) => {
                    warn!("Received unexpected response");
                }
            }
        }

        // Closing our sender lets the transport drain pending responses.
        drop(outgoing);
        transport.stop().await?;
        info!("MCP server stopped");
        Ok(())
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request: {} (id: {:?})", req.method, req.id);

        let result = match req.method.as_str() {
            "initialize" => self.handle_initialize(req.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(req.params).await,
            _ => Err(Error::MethodNotFound(req.method.clone())),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(req.id, value),
            Err(e) => {
                warn!("Request {} failed: {}", req.method, e);
                JsonRpcResponse::failure(req.id, e.rpc_code(), e.to_string())
            }
        }
    }

    /// Handle a notification.
    pub async fn handle_notification(&self, notif: JsonRpcNotification) {
        debug!("Handling notification: {}", notif.method);

        match notif.method.as_str() {
            "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                #[derive(serde::Deserialize)]
                struct CancelledParams {
                    #[serde(rename = "requestId")]
                    request_id: RequestId,
                }
                // Requests run to completion; a cancel only gets recorded.
                if let Some(Ok(cancel)) = notif
                    .params
                    .map(serde_json::from_value::<CancelledParams>)
                {
                    info!("Client cancelled request: {:?}", cancel.request_id);
                }
            }
            _ => {
                debug!("Unknown notification: {}", notif.method);
            }
        }
    }

    /// Answer an `initialize` request, negotiating the protocol version.
    pub fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        #[derive(serde::Deserialize)]
        struct InitParams {
            #[serde(rename = "protocolVersion")]
            protocol_version: Option<String>,
            #[serde(rename = "clientInfo")]
            client_info: Option<Value>,
        }

        let init = params.and_then(|v| serde_json::from_value::<InitParams>(v).ok());
        let requested = init.as_ref().and_then(|i| i.protocol_version.clone());
        if let Some(client) = init.as_ref().and_then(|i| i.client_info.as_ref()) {
            info!("Client connected: {}", client);
        }

        let result = InitializeResult {
            protocol_version: negotiate_version(requested.as_deref()).to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.server_info(),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_list_tools(&self) -> Result<Value> {
        let tools = self.handler.list_tools();
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value> {
        let params: CallToolParams = params
            .ok_or_else(|| Error::InvalidToolArguments("Missing params".to_string()))
            .and_then(|v| {
                serde_json::from_value(v).map_err(|e| Error::InvalidToolArguments(e.to_string()))
            })?;

        let handler = self
            .handler
            .get_tool(&params.name)
            .ok_or_else(|| Error::ToolNotFound(params.name.clone()))?;

        info!("Calling tool: {}", params.name);
        let result = handler.execute(params.arguments).await?;
        if result.is_error {
            warn!("Tool {} reported an error", params.name);
        }
        Ok(serde_json::to_value(result)?)
    }
}
