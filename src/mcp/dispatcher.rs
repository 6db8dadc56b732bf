//! Tool call dispatcher
//!
//! Resolves a call against the registry, validates it into a typed request,
//! performs the backend HTTP operation and folds every outcome into a
//! `ResponseEnvelope`. `handle` never fails.

use crate::config::{Backend, BackendConfig};
use crate::gateway::{route, HttpTransport, ReqwestTransport};
use crate::mcp::protocol::{
    CallToolResult, JsonRpcError, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
};
use crate::tools::{find_tool, ToolRequest};
use crate::types::{ConfigError, ErrorKind, GatewayError, Result};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A tool invocation as it arrives from the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// Content blocks; backend failures arrive here as an error-marked block
    Success(CallToolResult),
    Error { kind: ErrorKind, error: JsonRpcError },
}

impl ResponseEnvelope {
    /// Map a failure to its wire outcome.
    ///
    /// Backend and transport failures stay inside a successful result as a
    /// readable diagnostic; everything else becomes a JSON-RPC error.
    pub fn from_error(err: GatewayError, backend: Option<Backend>) -> Self {
        let kind = err.kind();
        let code = match kind {
            ErrorKind::Backend | ErrorKind::Transport => {
                let label = backend.map(|b| b.label()).unwrap_or("Backend");
                return ResponseEnvelope::Success(CallToolResult::error(format!(
                    "{} error: {}",
                    label, err
                )));
            }
            ErrorKind::Protocol => METHOD_NOT_FOUND,
            ErrorKind::Validation => INVALID_PARAMS,
            ErrorKind::Internal => INTERNAL_ERROR,
        };

        ResponseEnvelope::Error {
            kind,
            error: JsonRpcError::new(code, err.to_string()),
        }
    }

    pub fn into_response(self, id: Value) -> JsonRpcResponse {
        match self {
            ResponseEnvelope::Success(result) => match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(
                    id,
                    JsonRpcError::new(INTERNAL_ERROR, format!("Failed to serialize tool result: {}", e)),
                ),
            },
            ResponseEnvelope::Error { error, .. } => JsonRpcResponse::error(id, error),
        }
    }
}

pub struct Dispatcher {
    config: Arc<BackendConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    pub fn new(config: Arc<BackendConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Dispatcher backed by a real HTTP client
    pub fn with_http(config: Arc<BackendConfig>) -> std::result::Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config.http)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub async fn handle(&self, call: ToolCall) -> ResponseEnvelope {
        let backend = find_tool(&call.name).map(|t| t.backend);

        let outcome = AssertUnwindSafe(self.dispatch(&call)).catch_unwind().await;

        let err = match outcome {
            Ok(Ok(body)) => match serde_json::to_string(&body) {
                Ok(text) => return ResponseEnvelope::Success(CallToolResult::text(text)),
                Err(e) => GatewayError::from(e),
            },
            Ok(Err(err)) => err,
            Err(panic) => GatewayError::Internal(panic_message(panic.as_ref())),
        };

        match err.kind() {
            ErrorKind::Internal => error!("{} failed: {}", call.name, err),
            kind => warn!("{} failed ({:?}): {}", call.name, kind, err),
        }

        ResponseEnvelope::from_error(err, backend)
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value> {
        let tool = find_tool(&call.name)
            .ok_or_else(|| GatewayError::UnknownTool(call.name.clone()))?;

        let request = ToolRequest::parse(tool, &call.arguments)?;
        let backend_request = route(&request)?;
        let target = self.config.target(backend_request.backend);

        debug!(
            "Dispatching {} -> {} {} ({})",
            call.name, backend_request.method, backend_request.path, target.backend
        );

        self.transport.execute(target, &backend_request).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
