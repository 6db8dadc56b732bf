//! MCP server implementation
//!
//! Reads Content-Length framed JSON-RPC requests from stdin, dispatches
//! tool calls to the backends and writes framed responses to stdout.

use crate::mcp::dispatcher::{Dispatcher, ToolCall};
use crate::mcp::framing::FrameCodec;
use crate::mcp::protocol::*;
use crate::mcp::tools;
use anyhow::Result;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::future::Future;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

const SERVER_NAME: &str = "mt5-mcp";

const INSTRUCTIONS: &str = "Tools for a MetaTrader 5 trading account (account info, prices, \
positions, orders) and for running strategy tester optimizations. Backend failures are \
reported as tool results with isError set.";

/// How many requests to serve before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Until end of input or shutdown
    Stream,
    /// A single framed request
    Once,
}

pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run on stdio until end of input or Ctrl-C
    pub async fn run(&self, mode: ServeMode) -> Result<()> {
        info!("MCP server starting on stdio");

        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received, shutting down"),
                Err(e) => {
                    warn!("Failed to listen for interrupt: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        self.serve(tokio::io::stdin(), tokio::io::stdout(), mode, shutdown)
            .await
    }

    /// Serve framed requests from `reader`, writing responses to `writer`.
    ///
    /// Requests are handled one at a time so responses leave in arrival order.
    /// Returns at end of input, when `shutdown` resolves (also mid-request) or,
    /// in `Once` mode, after the first response.
    pub async fn serve<R, W, S>(&self, reader: R, writer: W, mode: ServeMode, shutdown: S) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let mut frames = FramedRead::new(reader, FrameCodec::new());
        let mut sink = FramedWrite::new(writer, FrameCodec::new());
        tokio::pin!(shutdown);

        loop {
            let frame = tokio::select! {
                frame = frames.next() => frame,
                _ = &mut shutdown => break,
            };

            let payload = match frame {
                Some(Ok(payload)) => payload,
                Some(Err(e)) => {
                    SinkExt::<JsonRpcResponse>::close(&mut sink).await?;
                    return Err(e.into());
                }
                None => {
                    info!("Client closed connection");
                    break;
                }
            };

            // A hung backend call must not hold off shutdown
            let response = tokio::select! {
                response = self.handle_message(&payload) => response,
                _ = &mut shutdown => {
                    info!("Shutting down with a request in flight");
                    break;
                }
            };

            // Notifications and skipped frames do not count towards --once
            if let Some(response) = response {
                sink.send(response).await?;
                debug!("Sent response");

                if mode == ServeMode::Once {
                    break;
                }
            }
        }

        SinkExt::<JsonRpcResponse>::close(&mut sink).await?;
        Ok(())
    }

    /// Handle one decoded frame; `None` when nothing should be written back
    pub async fn handle_message(&self, payload: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping undecodable frame ({} bytes): {}", payload.len(), e);
                return None;
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                // Only answer messages that carry an id, null included
                return match value.get("id") {
                    Some(id) => Some(JsonRpcResponse::error(
                        id.clone(),
                        JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                    )),
                    None => {
                        warn!("Skipping invalid request without id: {}", e);
                        None
                    }
                };
            }
        };

        debug!("Received request: {}", request.method);

        let Some(id) = request.id else {
            debug!("Notification: {}", request.method);
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" | "list_tools" => self.handle_list_tools(),
            "tools/call" | "call_tool" => return Some(self.handle_call_tool(id, request.params).await),
            _ => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(match result {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            None | Some(Value::Null) => InitializeParams::default(),
            Some(params) => serde_json::from_value(params).map_err(|e| {
                JsonRpcError::new(INVALID_PARAMS, format!("Invalid initialize params: {}", e))
            })?,
        };

        if let Some(client) = &params.client_info {
            info!(
                "Client connected: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: serde_json::json!({}),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        serde_json::to_value(result).map_err(|e| {
            JsonRpcError::new(INTERNAL_ERROR, format!("Failed to serialize result: {}", e))
        })
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: tools::get_tool_definitions(),
        };

        serde_json::to_value(result).map_err(|e| {
            JsonRpcError::new(INTERNAL_ERROR, format!("Failed to serialize tools: {}", e))
        })
    }

    async fn handle_call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(params.unwrap_or(Value::Null)) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::new(INVALID_PARAMS, format!("Invalid tool call params: {}", e)),
                );
            }
        };

        let call = ToolCall::new(params.name, params.arguments.unwrap_or(Value::Null));
        self.dispatcher.handle(call).await.into_response(id)
    }
}
