//! MCP Protocol Layer
//!
//! This module implements the Model Context Protocol server over stdio:
//! newline-delimited JSON-RPC 2.0 in, one response line per request out.

pub mod channel;
pub mod jsonrpc;
pub mod router;
pub mod server;

pub use channel::{LineReader, LineWriter};
pub use jsonrpc::{ErrorObject, Request, RequestId, Response, RpcError};
pub use router::ToolCallRouter;
pub use server::CodexMcpServer;
