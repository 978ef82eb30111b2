//! Configuration management for the MCP Server Creator.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::DEFAULT_SERVER_NAME;

/// Official uv install script.
pub const DEFAULT_INSTALL_SCRIPT_URL: &str = "https://astral.sh/uv/install.sh";

/// Command-line arguments for the MCP Server Creator.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-server-creator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server that scaffolds Python MCP server projects with uv")]
pub struct Args {
    /// Transport mode: stdio or http
    #[arg(short, long, default_value = "stdio", env = "MCP_CREATOR_TRANSPORT")]
    pub transport: Transport,

    /// HTTP port (only for http transport)
    #[arg(short, long, default_value = "3000", env = "MCP_CREATOR_PORT")]
    pub port: u16,

    /// Enable debug logging
    #[arg(short, long, env = "MCP_CREATOR_DEBUG")]
    pub debug: bool,

    /// Server name advertised to MCP clients
    #[arg(long, default_value = DEFAULT_SERVER_NAME, env = "MCP_CREATOR_NAME")]
    pub name: String,

    /// Path or name of the uv executable
    #[arg(long, default_value = "uv", env = "MCP_CREATOR_UV_BINARY")]
    pub uv_binary: PathBuf,

    /// Timeout for each uv invocation (seconds)
    #[arg(long, default_value = "300", env = "MCP_CREATOR_COMMAND_TIMEOUT")]
    pub command_timeout: u64,

    /// Do not try to install uv when it is missing
    #[arg(long, env = "MCP_CREATOR_NO_AUTO_INSTALL")]
    pub no_auto_install: bool,

    /// URL of the uv install script
    #[arg(long, default_value = DEFAULT_INSTALL_SCRIPT_URL, env = "MCP_CREATOR_INSTALL_SCRIPT_URL")]
    pub install_script_url: String,
}

/// Transport mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transport mode
    pub transport: Transport,
    /// HTTP port
    pub port: u16,
    /// Debug mode
    pub debug: bool,
    /// Advertised server name
    pub name: String,
    /// uv executable
    pub uv_binary: PathBuf,
    /// Per-command timeout in seconds
    pub command_timeout: u64,
    /// Install uv automatically when missing
    pub auto_install: bool,
    /// uv install script URL
    pub install_script_url: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            transport: args.transport,
            port: args.port,
            debug: args.debug,
            name: args.name,
            uv_binary: args.uv_binary,
            command_timeout: args.command_timeout,
            auto_install: !args.no_auto_install,
            install_script_url: args.install_script_url,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            port: 3000,
            debug: false,
            name: DEFAULT_SERVER_NAME.to_string(),
            uv_binary: PathBuf::from("uv"),
            command_timeout: 300,
            auto_install: true,
            install_script_url: DEFAULT_INSTALL_SCRIPT_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_default() {
        assert_eq!(Transport::default(), Transport::Stdio);
    }

    #[test]
    fn test_transport_serialization() {
        let transports = [
            (Transport::Stdio, "\"stdio\""),
            (Transport::Http, "\"http\""),
        ];

        for (transport, expected) in &transports {
            let json = serde_json::to_string(transport).unwrap();
            assert_eq!(json, *expected);
        }
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.port, 3000);
        assert!(!config.debug);
        assert_eq!(config.name, "Creation");
        assert_eq!(config.uv_binary, PathBuf::from("uv"));
        assert_eq!(config.command_timeout, 300);
        assert!(config.auto_install);
        assert_eq!(config.install_script_url, DEFAULT_INSTALL_SCRIPT_URL);
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{
            "transport": "http",
            "port": 8080,
            "debug": true,
            "name": "Scaffolder",
            "uv_binary": "/opt/uv/bin/uv",
            "command_timeout": 60,
            "auto_install": false,
            "install_script_url": "https://mirror.example.com/install.sh"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.port, 8080);
        assert_eq!(config.name, "Scaffolder");
        assert_eq!(config.uv_binary, PathBuf::from("/opt/uv/bin/uv"));
        assert!(!config.auto_install);
    }

    #[test]
    fn test_args_parse_and_convert() {
        let args = Args::parse_from([
            "mcp-server-creator",
            "--transport",
            "http",
            "--port",
            "4000",
            "--no-auto-install",
            "--uv-binary",
            "/usr/local/bin/uv",
        ]);

        let config: Config = args.into();

        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.port, 4000);
        assert!(!config.auto_install);
        assert_eq!(config.uv_binary, PathBuf::from("/usr/local/bin/uv"));
        assert_eq!(config.name, "Creation");
    }
}
