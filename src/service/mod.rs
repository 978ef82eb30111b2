//! Service layer for the MCP Server Creator.
//!
//! This module holds the scaffolding pipeline and the pieces it drives:
//! the uv toolchain, file templates and path handling.

pub mod paths;
pub mod scaffold;
pub mod templates;
pub mod toolchain;

pub use scaffold::{ScaffoldReport, ScaffoldService};
pub use toolchain::{ScaffoldStep, Toolchain, UvToolchain};
