//! Project requests and the client configuration they produce.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Description used when the caller does not provide one.
pub const DEFAULT_SERVER_DESCRIPTION: &str = "Custom MCP Server";

/// Entry point written into every generated project.
pub const ENTRY_POINT: &str = "main.py";

/// Launcher command clients use to start a generated server.
pub const LAUNCH_COMMAND: &str = "uv";

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid project name regex"))
}

/// A request to scaffold a new MCP server project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    /// Directory name of the new project, also its key in `mcpServers`.
    pub project_name: String,
    /// Parent directory. May start with `~`.
    pub project_location: String,
    /// Name passed to `FastMCP(...)` and shown in the README.
    #[serde(default = "default_description")]
    pub server_description: String,
}

fn default_description() -> String {
    DEFAULT_SERVER_DESCRIPTION.to_string()
}

impl ProjectRequest {
    pub fn new(project_name: impl Into<String>, project_location: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_location: project_location.into(),
            server_description: default_description(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.server_description = description.into();
        self
    }

    /// Reject names that would escape the target location or break the
    /// generated config.
    pub fn validate(&self) -> Result<()> {
        let name = self.project_name.as_str();
        let invalid = |reason: &str| Error::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if name == "." || name == ".." {
            return Err(invalid("name must not be a relative path component"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(invalid("name must not contain path separators"));
        }
        if !project_name_pattern().is_match(name) {
            return Err(invalid(
                "only letters, digits, '.', '_' and '-' are allowed",
            ));
        }
        if self.project_location.trim().is_empty() {
            return Err(Error::DirectoryCreation {
                path: self.project_location.clone(),
                message: "project location must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// One server entry in `claude_desktop_config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub command: String,
    pub args: Vec<String>,
}

impl McpServerEntry {
    /// `uv --directory <dir> run main.py`
    pub fn for_directory(dir: &Path) -> Self {
        Self {
            command: LAUNCH_COMMAND.to_string(),
            args: vec![
                "--directory".to_string(),
                dir.display().to_string(),
                "run".to_string(),
                ENTRY_POINT.to_string(),
            ],
        }
    }

    /// Arguments joined the way Cursor's settings dialog expects them.
    pub fn args_line(&self) -> String {
        self.args.join(" ")
    }
}

/// The `claude_desktop_config.json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub mcp_servers: BTreeMap<String, McpServerEntry>,
}

impl ClientConfig {
    /// Config registering a single project.
    pub fn for_project(name: &str, dir: &Path) -> Self {
        let mut mcp_servers = BTreeMap::new();
        mcp_servers.insert(name.to_string(), McpServerEntry::for_directory(dir));
        Self { mcp_servers }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
