//! MT5 MCP - Model Context Protocol server for MetaTrader 5
//!
//! Exposes trading-account and strategy-optimization REST APIs as MCP
//! tools over Content-Length framed JSON-RPC on stdio.

pub mod config;
pub mod gateway;
pub mod mcp;
pub mod tools;
pub mod types;

pub use config::{BackendConfig, ConfigLoader};
pub use gateway::{HttpTransport, ReqwestTransport};
pub use mcp::{Dispatcher, McpServer, ResponseEnvelope, ServeMode, ToolCall};
pub use types::{ErrorKind, GatewayError};
