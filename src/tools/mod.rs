//! Tool registry, argument validation and typed tool requests

pub mod registry;
pub mod request;
pub mod validate;

pub use registry::{find_tool, list_tools, ParamSpec, ParamType, ToolDefinition};
pub use request::ToolRequest;
pub use validate::{validate, ValidationResult};
