//! JSON-RPC 2.0 envelopes for MCP
//!
//! Requests, responses and the error-code vocabulary this server uses.
//! The implementation is self-contained without external JSON-RPC libraries.

use rmcp::model::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use codex_mcp_core::Error;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request ID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric ID
    Number(serde_json::Number),
    /// String ID
    String(String),
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// An inbound JSON-RPC message.
///
/// A missing or null `id` marks a notification. A missing `method` is kept
/// as `None` so the dispatcher can answer it with "method not found".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Expected to be "2.0"; not enforced
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Request ID, absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Method name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    /// Build a request (used by tests and tooling).
    pub fn new(id: Option<RequestId>, method: &str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            id,
            method: Some(method.to_string()),
            params,
        }
    }

    /// Whether no response is expected.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Parse one inbound line.
///
/// Anything that is not a JSON object with well-typed fields is a
/// `MalformedEnvelope`; there is no id to answer it with.
pub fn parse_request_str(text: &str) -> Result<Request, Error> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::MalformedEnvelope(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::MalformedEnvelope(e.to_string()))
}

/// Outcome carried by a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    /// Success
    Result(Value),
    /// Failure
    Error(ErrorObject),
}

/// A JSON-RPC 2.0 response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Request ID that this response corresponds to
    pub id: RequestId,
    /// Result or error
    #[serde(flatten)]
    pub payload: Payload,
}

impl Response {
    /// Create a successful response
    pub fn success(id: RequestId, result: Value) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: Payload::Result(result),
        }
    }

    /// Create an error response
    pub fn error(id: RequestId, error: ErrorObject) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: Payload::Error(error),
        }
    }

    /// Create an error response from RpcError
    pub fn from_error(id: RequestId, err: RpcError) -> Self {
        Response::error(id, err.into())
    }

    /// The result, if successful.
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Result(value) => Some(value),
            Payload::Error(_) => None,
        }
    }

    /// The error, if failed.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.payload {
            Payload::Result(_) => None,
            Payload::Error(error) => Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        ErrorObject {
            code: err.code().0,
            message: err.message(),
            data: None,
        }
    }
}

/// Errors this server answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The method does not exist / is not available (-32601)
    MethodNotFound(String),
    /// Invalid method parameter(s) or unknown tool (-32602)
    InvalidParams(String),
    /// Failure while executing a tool call (-32603)
    InternalError(String),
}

impl RpcError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::MethodNotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => ErrorCode::INVALID_PARAMS,
            RpcError::InternalError(_) => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            RpcError::MethodNotFound(method) => format!("Method not found: {method}"),
            RpcError::InvalidParams(msg) | RpcError::InternalError(msg) => msg.clone(),
        }
    }
}

impl From<Error> for RpcError {
    fn from(err: Error) -> Self {
        match err {
            Error::UnknownMethod(method) => RpcError::MethodNotFound(method),
            other if other.rpc_code() == ErrorCode::INVALID_PARAMS.0 => {
                RpcError::InvalidParams(other.to_string())
            }
            other => RpcError::InternalError(other.to_string()),
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_mcp_core::ExitStatusCode;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"test","id":1}"#).unwrap();
        assert_eq!(req.method.as_deref(), Some("test"));
        assert_eq!(req.id, Some(RequestId::from(1)));
        assert!(!req.is_notification());
    }

    #[test]
    fn test_parse_request_with_params() {
        let json = r#"{"jsonrpc":"2.0","method":"test","params":{"key":"value"},"id":"abc"}"#;
        let req = parse_request_str(json).unwrap();
        assert_eq!(req.id, Some(RequestId::from("abc")));
        assert_eq!(req.params, Some(json!({"key": "value"})));
    }

    #[test]
    fn test_parse_notification() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"initialized"}"#).unwrap();
        assert!(req.is_notification());

        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"x","id":null}"#).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn test_parse_missing_method() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","id":7}"#).unwrap();
        assert_eq!(req.method, None);
        assert_eq!(req.id, Some(RequestId::from(7)));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_request_str("{not json"),
            Err(Error::MalformedEnvelope(_))
        ));
        assert!(matches!(
            parse_request_str(r#"["2.0", 1, "initialize"]"#),
            Err(Error::MalformedEnvelope(_))
        ));
        assert!(matches!(
            parse_request_str(r#"{"method": 5, "id": 1}"#),
            Err(Error::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_response_success_shape() {
        let resp = Response::success(RequestId::from(1), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}})
        );
    }

    #[test]
    fn test_response_error_shape() {
        let resp = Response::from_error(
            RequestId::from("a"),
            RpcError::MethodNotFound("ping".to_string()),
        );
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": "a",
                "error": {"code": -32601, "message": "Method not found: ping"}
            })
        );
    }

    #[test]
    fn test_response_roundtrip_keeps_payload() {
        let resp = Response::from_error(
            RequestId::from(3),
            RpcError::InternalError("boom".to_string()),
        );
        let json = serde_json::to_string(&resp).unwrap();
        let back: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error_object().unwrap().code, -32603);
        assert!(back.result().is_none());
    }

    #[test]
    fn test_domain_error_mapping() {
        let err: RpcError = Error::UnknownTool("bogus".to_string()).into();
        assert_eq!(err.code(), ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message(), "Unknown tool: bogus");

        let err: RpcError = Error::ExternalProcessFailed {
            code: ExitStatusCode::Code(2),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message(), "Codex process exited with code 2");

        let err: RpcError = Error::UnknownMethod("ping".to_string()).into();
        assert_eq!(err.code(), ErrorCode::METHOD_NOT_FOUND);
    }
}
