//! MCP Server Creator
//!
//! An MCP server that scaffolds Python MCP server projects with uv.

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcp_server_creator::config::{Args, Config, Transport};
use mcp_server_creator::error::{Error, Result};
use mcp_server_creator::mcp::handler::McpHandler;
use mcp_server_creator::mcp::server::McpServer;
use mcp_server_creator::mcp::transport::StdioTransport;
use mcp_server_creator::service::{ScaffoldService, UvToolchain};
use mcp_server_creator::tools;
use mcp_server_creator::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to set tracing subscriber: {}", e)))?;

    let config: Config = args.into();

    info!("MCP Server Creator v{}", VERSION);
    info!("Transport: {:?}", config.transport);
    info!("uv binary: {}", config.uv_binary.display());

    let toolchain = Arc::new(UvToolchain::from_config(&config));
    let scaffold_service =
        Arc::new(ScaffoldService::new(toolchain).with_auto_install(config.auto_install));

    let mut handler = McpHandler::new();
    tools::register_all_tools(&mut handler, scaffold_service);
    info!("Registered {} MCP tools", handler.tool_count());

    let server = McpServer::new(handler, config.name.clone());

    match config.transport {
        Transport::Stdio => {
            info!("Starting stdio transport...");
            server.run(StdioTransport::new()).await?;
        }
        Transport::Http => {
            info!("Starting HTTP transport on port {}...", config.port);
            mcp_server_creator::http::start_server(&config, Arc::new(server)).await?;
        }
    }

    Ok(())
}
