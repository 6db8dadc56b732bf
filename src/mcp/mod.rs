//! MCP server, stdio framing and tool dispatch

pub mod dispatcher;
pub mod framing;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatcher::{Dispatcher, ResponseEnvelope, ToolCall};
pub use server::{McpServer, ServeMode};
