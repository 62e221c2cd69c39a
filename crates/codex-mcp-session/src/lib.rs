//! # codex-mcp-session
//!
//! Codex process invocation and session tracking for the Codex MCP Server.
//!
//! This crate provides:
//! - Command-line construction for `codex exec` and `codex exec resume`
//! - Folding of the `--json` event stream into a result and session id
//! - A last-resort raw-text scan for the session id
//! - The in-memory session table
//! - The runner that spawns codex, streams its output and enforces deadlines
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on codex-mcp-core and is
//! driven by the protocol layer in the codex-mcp crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod events;
pub mod fallback;
pub mod runner;
pub mod table;

// Re-export commonly used types
pub use command::{CodexCommand, ResumeRequest, StartRequest};
pub use events::{EventFold, ExecEvent, ExecItem, FoldOutcome};
pub use fallback::scan_session_id;
pub use runner::{CodexRunner, ResumeOutcome, RunnerConfig, StartOutcome};
pub use table::SessionTable;
