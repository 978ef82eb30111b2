//! Error types for the MCP Server Creator.

use std::path::PathBuf;
use thiserror::Error;

use crate::mcp::protocol::error_codes;
use crate::service::toolchain::ScaffoldStep;

/// Result type alias for MCP Server Creator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the MCP Server Creator.
#[derive(Error, Debug)]
pub enum Error {
    // ===== MCP Errors =====
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    // ===== Scaffolding Errors =====
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("Failed to create directory {path}: {message}")]
    DirectoryCreation { path: String, message: String },

    #[error("Directory {} already exists. Please choose a different name or location.", .0.display())]
    ProjectExists(PathBuf),

    #[error("Automatic installation of uv is only supported on MacOS and Linux. Please install uv manually.")]
    UnsupportedPlatform,

    #[error("Failed to install uv package manager. Please install it manually.")]
    InstallFailed(String),

    #[error("Failed to {}", .step.action())]
    StepFailed { step: ScaffoldStep, detail: String },

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== HTTP Errors =====
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP server error: {0}")]
    HttpServer(String),

    // ===== Internal Errors =====
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {command} did not finish within {seconds} seconds")]
    Timeout { command: String, seconds: u64 },
}

impl Error {
    /// JSON-RPC error code used when this error escapes a request handler.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidToolArguments(_) | Self::ToolNotFound(_) => error_codes::INVALID_PARAMS,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether this error comes from the scaffolding pipeline and should be
    /// reported to the client as a tool-level failure.
    pub fn is_scaffold_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidProjectName { .. }
                | Self::DirectoryCreation { .. }
                | Self::ProjectExists(_)
                | Self::UnsupportedPlatform
                | Self::InstallFailed(_)
                | Self::StepFailed { .. }
                | Self::Timeout { .. }
                | Self::Io(_)
        )
    }
}
