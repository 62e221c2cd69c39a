//! Codex MCP Server Implementation
//!
//! This module implements the request dispatcher: it reads one JSON-RPC
//! message per line, answers `initialize`, `tools/list` and `tools/call`, and
//! writes exactly one response for every message that carries an id.
//!
//! Calls are handled one at a time. A `tools/call` is awaited in place, so
//! the next line is not read until the codex invocation has settled, and
//! dropping the server future kills any in-flight child.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{debug, error, info, warn};

use codex_mcp_core::Error;
use codex_mcp_session::CodexRunner;

use super::channel::{LineReader, LineWriter};
use super::jsonrpc::{parse_request_str, Request, Response, RpcError};
use super::router::ToolCallRouter;
use crate::tools::all_tools;

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name announced in `serverInfo`.
pub const SERVER_NAME: &str = "codex-mcp";

/// Codex MCP Server
///
/// Dispatches MCP requests and routes tool calls to the codex runner.
#[derive(Debug, Clone)]
pub struct CodexMcpServer {
    router: ToolCallRouter,
    initialized: Arc<AtomicBool>,
}

impl CodexMcpServer {
    /// Create a server with a default runner.
    pub fn new() -> Self {
        Self::with_runner(Arc::new(CodexRunner::new()))
    }

    /// Create a server over an existing runner.
    pub fn with_runner(runner: Arc<CodexRunner>) -> Self {
        Self {
            router: ToolCallRouter::new(runner),
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The runner tool calls are routed to.
    pub fn runner(&self) -> &CodexRunner {
        self.router.runner()
    }

    /// Serve on the process stdin/stdout until stdin closes.
    pub async fn run(&self) -> std::io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve on an arbitrary line stream until it ends.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = LineReader::new(reader);
        let mut writer = LineWriter::new(writer);

        info!("Codex MCP Server ready, reading requests");

        while let Some(line) = reader.next_line().await? {
            if line.is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                writer.write_json(&response).await?;
            }
        }

        info!("Input closed, stopping");
        Ok(())
    }

    /// Handle one raw line. Returns the response to write, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        match parse_request_str(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                error!("Dropping unparseable message: {}", e);
                None
            }
        }
    }

    /// Dispatch one request.
    ///
    /// Notifications never produce a response; every request with an id
    /// produces exactly one.
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let Request {
            id, method, params, ..
        } = request;

        let Some(method) = method else {
            return match id {
                Some(id) => {
                    warn!("Request {} has no method", id);
                    Some(Response::from_error(
                        id,
                        Error::UnknownMethod("<missing>".to_string()).into(),
                    ))
                }
                None => {
                    warn!("Dropping message with neither id nor method");
                    None
                }
            };
        };

        debug!("Received {} (id={:?})", method, id);

        let outcome: Result<Value, RpcError> = match method.as_str() {
            "initialize" => Ok(self.handle_initialize(params.as_ref())),
            "initialized" | "notifications/initialized" => {
                debug!("Client finished initialization");
                Ok(json!({}))
            }
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => {
                if id.is_none() {
                    warn!("Ignoring tools/call sent as a notification");
                    return None;
                }
                self.handle_tools_call(params).await
            }
            other => Err(Error::UnknownMethod(other.to_string()).into()),
        };

        let Some(id) = id else {
            if let Err(e) = outcome {
                debug!("Notification {} not handled: {}", method, e);
            }
            return None;
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(e) => {
                if matches!(e, RpcError::MethodNotFound(_)) {
                    warn!("Unknown method: {}", method);
                }
                Response::from_error(id, e)
            }
        })
    }

    /// Result of `initialize`. Client parameters are logged but never
    /// change the answer.
    pub fn handle_initialize(&self, params: Option<&Value>) -> Value {
        let client = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!("Initialize from client {}", client);
        self.initialized.store(true, Ordering::SeqCst);

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    /// Result of `tools/list`.
    pub fn handle_tools_list(&self) -> Value {
        json!({ "tools": all_tools() })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, RpcError> {
        if !self.initialized.load(Ordering::SeqCst) {
            warn!("tools/call received before initialize");
        }
        self.router.call(params).await
    }
}

impl Default for CodexMcpServer {
    fn default() -> Self {
        Self::new()
    }
}
