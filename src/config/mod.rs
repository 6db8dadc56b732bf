//! Configuration system for the MT5 MCP server
//!
//! Backend addresses and credentials are resolved once at startup with
//! the following precedence (highest to lowest):
//! 1. Command line flags
//! 2. Process environment
//! 3. Config file (TOML)
//! 4. Built-in defaults

mod backend;
mod defaults;
mod loader;
mod user_config;

pub use backend::{Backend, BackendConfig, BackendTarget, HttpSettings};
pub use defaults::*;
pub use loader::{ConfigLoader, Overrides};
pub use user_config::{BackendSection, FileConfig, HttpSection};
