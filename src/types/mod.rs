//! Shared data types.

pub mod project;

pub use project::*;
