//! MCP view of the tool registry

use crate::mcp::protocol::Tool;
use crate::tools::{list_tools, ToolDefinition};

impl From<&ToolDefinition> for Tool {
    fn from(def: &ToolDefinition) -> Self {
        Tool {
            name: def.name.to_string(),
            description: def.description.to_string(),
            input_schema: def.input_schema(),
        }
    }
}

/// Get all tool definitions in catalog order
pub fn get_tool_definitions() -> Vec<Tool> {
    list_tools().iter().map(Tool::from).collect()
}
