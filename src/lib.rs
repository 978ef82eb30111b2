//! MCP Server Creator - Rust Implementation
//!
//! A Model Context Protocol (MCP) server that scaffolds new Python MCP server
//! projects with the `uv` package manager and tells you how to wire them into
//! Claude Desktop or Cursor.
//!
//! # Architecture
//!
//! 1. **MCP Layer** (`mcp`) - Protocol types, stdio transport, dispatch
//! 2. **Service Layer** (`service`) - Scaffolding pipeline, uv toolchain, templates
//! 3. **Tools Layer** (`tools`) - `create_mcp_server` and `client_config`
//! 4. **HTTP** (`http`) - Alternative transport for web-based clients

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod service;
pub mod tools;
pub mod types;

pub use error::{Error, Result};

/// Server version reported during `initialize`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name advertised to clients unless overridden.
pub const DEFAULT_SERVER_NAME: &str = "Creation";
