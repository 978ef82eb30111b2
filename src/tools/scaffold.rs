//! Project scaffolding tools.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::mcp::handler::{error_result, get_string_arg, get_string_arg_or, success_result, ToolHandler};
use crate::mcp::protocol::{Tool, ToolAnnotations, ToolResult};
use crate::service::paths::{absolutize, expand_user};
use crate::service::templates::render_client_config;
use crate::service::ScaffoldService;
use crate::types::{ProjectRequest, DEFAULT_SERVER_DESCRIPTION};

/// Create a new Python MCP server project.
pub struct CreateMcpServerTool {
    service: Arc<ScaffoldService>,
}

impl CreateMcpServerTool {
    pub fn new(service: Arc<ScaffoldService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ToolHandler for CreateMcpServerTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "create_mcp_server".to_string(),
            description: "Automatically creates an MCP server project. Sets up a uv project with a virtual environment, installs mcp[cli] and httpx, writes a FastMCP main.py with an example tool, and a README explaining how to connect it to Claude Desktop and Cursor. Returns the setup log.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "project_name": {
                        "type": "string",
                        "description": "The name of the MCP server project to create"
                    },
                    "project_location": {
                        "type": "string",
                        "description": "The directory in which to create the project (e.g. ~/projects)"
                    },
                    "server_description": {
                        "type": "string",
                        "description": "A brief description of what your server does",
                        "default": DEFAULT_SERVER_DESCRIPTION
                    }
                },
                "required": ["project_name", "project_location"]
            }),
            annotations: Some(ToolAnnotations::additive().with_title("Create MCP Server")),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let project_name = get_string_arg(&args, "project_name")?;
        let project_location = get_string_arg(&args, "project_location")?;
        let description =
            get_string_arg_or(&args, "server_description", DEFAULT_SERVER_DESCRIPTION);

        let request =
            ProjectRequest::new(project_name, project_location).with_description(description);

        match self.service.create(&request).await {
            Ok(report) => Ok(success_result(report.message())),
            Err(e) if e.is_scaffold_failure() => {
                warn!("Scaffolding {} failed: {:?}", request.project_name, e);
                Ok(error_result(format!("❌ {}", e)))
            }
            Err(e) => Err(e),
        }
    }
}

/// Show the client configuration for an existing project directory.
pub struct ClientConfigTool;

impl ClientConfigTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClientConfigTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for ClientConfigTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "client_config".to_string(),
            description: "Show the claude_desktop_config.json entry and Cursor settings that launch an existing MCP server project with uv.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "project_name": {
                        "type": "string",
                        "description": "Key to register the server under"
                    },
                    "project_path": {
                        "type": "string",
                        "description": "Directory containing the project's main.py"
                    }
                },
                "required": ["project_name", "project_path"]
            }),
            annotations: Some(ToolAnnotations::read_only().with_title("Client Config")),
        }
    }

    async fn execute(&self, args: HashMap<String, Value>) -> Result<ToolResult> {
        let project_name = get_string_arg(&args, "project_name")?;
        let project_path = get_string_arg(&args, "project_path")?;

        let dir = absolutize(&expand_user(&project_path))?;
        if !dir.is_dir() {
            return Ok(error_result(format!(
                "❌ Directory {} does not exist",
                dir.display()
            )));
        }

        Ok(success_result(render_client_config(&project_name, &dir)?))
    }
}
