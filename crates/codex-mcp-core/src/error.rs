//! Error types for the Codex MCP Server.

use std::fmt;

use thiserror::Error;

/// JSON-RPC "method not found" code.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC "invalid params" code.
pub const INVALID_PARAMS: i32 = -32602;
/// JSON-RPC "internal error" code.
pub const INTERNAL_ERROR: i32 = -32603;

/// How the external agent process ended when it did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusCode {
    /// Process exited with a status code
    Code(i32),
    /// Process was terminated by a signal and has no status code
    Signal,
}

impl fmt::Display for ExitStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatusCode::Code(code) => write!(f, "exited with code {code}"),
            ExitStatusCode::Signal => write!(f, "was terminated by a signal"),
        }
    }
}

impl From<Option<i32>> for ExitStatusCode {
    fn from(code: Option<i32>) -> Self {
        code.map_or(ExitStatusCode::Signal, ExitStatusCode::Code)
    }
}

/// Main error type for Codex MCP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Inbound line is not valid JSON or not a JSON-RPC envelope
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Method name is not served
    #[error("Method not found: {0}")]
    UnknownMethod(String),

    /// Tool name is not one of the declared tools
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not satisfy the tool's input schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// External agent exited unsuccessfully
    #[error("Codex process {code}")]
    ExternalProcessFailed {
        /// Exit code, or signal termination
        code: ExitStatusCode,
    },

    /// Agent exited successfully but never reported a session id
    #[error("Codex finished without reporting a session id")]
    SessionIdMissing,

    /// Invocation exceeded its deadline and was killed
    #[error("Codex invocation timed out after {0}s")]
    Timeout(u64),

    /// External agent could not be started
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// JSON-RPC error code this error surfaces as when it ends a tool call.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Error::UnknownMethod(_) => METHOD_NOT_FOUND,
            Error::UnknownTool(_) | Error::InvalidArguments(_) => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
