//! MCP Tool Types and Descriptors
//!
//! This module defines the parameter types of the two tools and the static
//! descriptors returned by `tools/list`.

use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use codex_mcp_core::{Error, Result, SessionId};
use codex_mcp_session::{ResumeRequest, StartRequest};

use crate::schema::SchemaTransformer;

/// Name of the tool that starts a conversation.
pub const CODEX_TOOL: &str = "codex";

/// Name of the tool that continues a conversation.
pub const CODEX_REPLY_TOOL: &str = "codex-reply";

// =============================================================================
// codex
// =============================================================================

/// Parameters for codex
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodexToolParams {
    /// The initial user prompt to start the Codex conversation.
    pub prompt: String,

    /// Sandbox mode: `read-only`, `workspace-write` or `danger-full-access`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,

    /// Optional override for the model name (e.g. "o3", "o4-mini").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Working directory for the session. Defaults to the server's working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Approval policy for shell commands: `untrusted`, `on-failure`, `on-request` or `never`.
    #[serde(rename = "approval-policy", skip_serializing_if = "Option::is_none")]
    pub approval_policy: Option<String>,
}

impl CodexToolParams {
    /// Check constraints the schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "'prompt' must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert into an invocation request. Optional values pass through verbatim.
    pub fn into_request(self) -> StartRequest {
        StartRequest {
            prompt: self.prompt,
            sandbox: self.sandbox,
            model: self.model,
            cwd: self.cwd,
            approval_policy: self.approval_policy,
        }
    }
}

// =============================================================================
// codex-reply
// =============================================================================

/// Parameters for codex-reply
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodexReplyToolParams {
    /// The conversation id returned by the `codex` tool.
    #[serde(rename = "conversationId")]
    pub conversation_id: String,

    /// The next user prompt to continue the Codex conversation.
    pub prompt: String,
}

impl CodexReplyToolParams {
    /// Check constraints the schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.conversation_id.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "'conversationId' must be a non-empty string".to_string(),
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "'prompt' must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert into an invocation request.
    pub fn into_request(self) -> ResumeRequest {
        ResumeRequest {
            session_id: SessionId::from(self.conversation_id),
            prompt: self.prompt,
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Descriptor of the `codex` tool.
pub fn codex_tool() -> Tool {
    Tool::new(
        CODEX_TOOL,
        "Run a Codex session. Accepts configuration parameters matching the Codex Config struct. \
         Returns the agent's final message followed by a [SESSION_ID: <id>] marker.",
        SchemaTransformer::input_schema::<CodexToolParams>(),
    )
}

/// Descriptor of the `codex-reply` tool.
pub fn codex_reply_tool() -> Tool {
    Tool::new(
        CODEX_REPLY_TOOL,
        "Continue a Codex session by providing the conversation id and prompt.",
        SchemaTransformer::input_schema::<CodexReplyToolParams>(),
    )
}

/// Every tool, in `tools/list` order.
pub fn all_tools() -> Vec<Tool> {
    vec![codex_tool(), codex_reply_tool()]
}

/// Format the marker that carries the session id in text-only results.
pub fn session_marker(session_id: &SessionId) -> String {
    format!("[SESSION_ID: {session_id}]")
}
