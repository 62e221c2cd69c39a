//! # codex-mcp-core
//!
//! Core types for the Codex MCP Server.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other codex-mcp crates. It provides:
//!
//! - Session types (SessionId, SessionRecord)
//! - Error types shared by the invocation engine and the protocol layer
//! - Server configuration loaded from YAML
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other codex-mcp crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use config::{CodexSettings, ServerConfig, ServerSettings, SessionSettings};
pub use error::{Error, ExitStatusCode, Result};
pub use session::{SessionId, SessionRecord};
