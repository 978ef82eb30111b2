//! MCP tool implementations.
//!
//! - `scaffold` - Project creation and client configuration (2 tools)

pub mod scaffold;

use std::sync::Arc;

use crate::mcp::handler::McpHandler;
use crate::service::ScaffoldService;

/// Register all tools with the handler.
pub fn register_all_tools(handler: &mut McpHandler, scaffold_service: Arc<ScaffoldService>) {
    handler.register(scaffold::CreateMcpServerTool::new(scaffold_service));
    handler.register(scaffold::ClientConfigTool::new());
}
