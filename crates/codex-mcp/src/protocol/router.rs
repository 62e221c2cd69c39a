//! Tool call routing.
//!
//! Maps a `tools/call` request onto the codex runner and formats the
//! outcome as an MCP `CallToolResult`.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use codex_mcp_core::Error;
use codex_mcp_session::CodexRunner;

use super::jsonrpc::RpcError;
use crate::tools::{
    session_marker, CodexReplyToolParams, CodexToolParams, CODEX_REPLY_TOOL, CODEX_TOOL,
};

/// Routes tool calls to the runner.
#[derive(Debug, Clone)]
pub struct ToolCallRouter {
    runner: Arc<CodexRunner>,
}

impl ToolCallRouter {
    /// Create a router over a shared runner.
    pub fn new(runner: Arc<CodexRunner>) -> Self {
        Self { runner }
    }

    /// The runner calls are routed to.
    pub fn runner(&self) -> &CodexRunner {
        &self.runner
    }

    /// Handle the `params` of a `tools/call` request.
    ///
    /// Returns the serialized `CallToolResult` on success.
    #[instrument(skip_all)]
    pub async fn call(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let mut params = match params {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::InvalidParams(
                    "tools/call params must be an object".to_string(),
                ))
            }
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(RpcError::InvalidParams(
                    "tools/call requires a string 'name'".to_string(),
                ))
            }
        };
        let arguments = match params.remove("arguments") {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(arguments) => arguments,
        };

        debug!("tools/call name={}", name);

        let result = match name.as_str() {
            CODEX_TOOL => self.call_codex(arguments).await,
            CODEX_REPLY_TOOL => self.call_codex_reply(arguments).await,
            _ => Err(Error::UnknownTool(name.clone())),
        };

        match result {
            Ok(result) => serde_json::to_value(result).map_err(|e| {
                error!("Failed to serialize {} result: {}", name, e);
                RpcError::InternalError(e.to_string())
            }),
            Err(e) => {
                error!("Tool {} failed: {}", name, e);
                Err(e.into())
            }
        }
    }

    async fn call_codex(&self, arguments: Value) -> Result<CallToolResult, Error> {
        let params: CodexToolParams = parse_arguments(arguments)?;
        params.validate()?;

        let outcome = self.runner.start(params.into_request()).await?;
        info!("codex returned session {}", outcome.session_id);

        Ok(CallToolResult::success(vec![
            Content::text(outcome.text),
            Content::text(session_marker(&outcome.session_id)),
        ]))
    }

    async fn call_codex_reply(&self, arguments: Value) -> Result<CallToolResult, Error> {
        let params: CodexReplyToolParams = parse_arguments(arguments)?;
        params.validate()?;

        let outcome = self.runner.resume(params.into_request()).await?;
        Ok(CallToolResult::success(vec![Content::text(outcome.text)]))
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, Error> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArguments(e.to_string()))
}
