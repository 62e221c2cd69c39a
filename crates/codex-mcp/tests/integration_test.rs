//! Integration tests for the codex-mcp server.
//!
//! Each test feeds newline-delimited JSON-RPC into `CodexMcpServer::serve`
//! and inspects the lines written back. Tool calls run against a shell
//! script standing in for the codex executable.

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use codex_mcp::CodexMcpServer;
use codex_mcp_core::SessionId;
use codex_mcp_session::{CodexRunner, RunnerConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

const THREAD_ID: &str = "11111111-1111-1111-1111-111111111111";

fn server_with_script(dir: &TempDir, body: &str) -> CodexMcpServer {
    let script = dir.path().join("codex.sh");
    std::fs::write(&script, body).unwrap();
    CodexMcpServer::with_runner(Arc::new(CodexRunner::with_config(RunnerConfig {
        command: "sh".to_string(),
        args: vec![script.display().to_string()],
        timeout: Some(Duration::from_secs(10)),
        max_sessions: 10,
    })))
}

/// Run the server over `input` and return the raw output text.
async fn serve_raw(server: &CodexMcpServer, input: &str) -> String {
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

/// Run the server over `input` and parse every output line.
async fn serve(server: &CodexMcpServer, input: &str) -> Vec<Value> {
    serve_raw(server, input)
        .await
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let server = CodexMcpServer::new();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test","version":"1"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
    );

    let responses = serve(&server, input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(
        responses[0],
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}, "resources": {}},
                "serverInfo": {"name": "codex-mcp", "version": env!("CARGO_PKG_VERSION")}
            }
        })
    );
}

#[tokio::test]
async fn test_tools_list_is_stable() {
    let server = CodexMcpServer::new();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
        "\n",
    );

    let output = serve_raw(&server, input).await;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);

    let response: Value = serde_json::from_str(lines[0]).unwrap();
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "codex");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["prompt"]));
    assert_eq!(tools[1]["name"], "codex-reply");
    assert!(tools[1]["inputSchema"]["properties"]["conversationId"].is_object());
}

#[tokio::test]
async fn test_unknown_method() {
    let server = CodexMcpServer::new();
    let responses = serve(&server, "{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n").await;

    assert_eq!(
        responses,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": {"code": -32601, "message": "Method not found: ping"}
        })]
    );
}

#[tokio::test]
async fn test_unknown_tool() {
    let server = CodexMcpServer::new();
    let responses = serve(&server, &format!("{}\n", call(3, "bogus", json!({})))).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 3);
    assert_eq!(responses[0]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_noise_is_ignored() {
    let server = CodexMcpServer::new();
    let input = concat!(
        "\n",
        "   \n",
        "this is not json\n",
        "[1,2,3]\n",
        r#"{"jsonrpc":"2.0","method":"initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":"last","method":"tools/list"}"#,
        "\n",
    );

    let responses = serve(&server, input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "last");
}

#[tokio::test]
async fn test_codex_start_returns_text_and_session_marker() {
    let dir = TempDir::new().unwrap();
    let server = server_with_script(
        &dir,
        &format!(
            r#"
printf '%s\n' '{{"type":"thread.started","thread_id":"{THREAD_ID}"}}'
printf '%s\n' '{{"type":"item.completed","item":{{"type":"agent_message","text":"hello"}}}}'
"#
        ),
    );

    let responses = serve(&server, &format!("{}\n", call(1, "codex", json!({"prompt": "hi"})))).await;

    assert_eq!(responses.len(), 1);
    let content = responses[0]["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "hello");
    assert_eq!(content[1]["text"], format!("[SESSION_ID: {THREAD_ID}]"));

    let record = server
        .runner()
        .sessions()
        .get(&SessionId::from(THREAD_ID))
        .await
        .unwrap();
    assert_eq!(record.initial_prompt, "hi");
}

#[tokio::test]
async fn test_codex_start_failure_is_internal_error() {
    let dir = TempDir::new().unwrap();
    let server = server_with_script(&dir, "echo 'boom' >&2\nexit 2\n");

    let responses = serve(&server, &format!("{}\n", call(5, "codex", json!({"prompt": "hi"})))).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["error"]["code"], -32603);
    let message = responses[0]["error"]["message"].as_str().unwrap();
    assert!(message.contains('2'), "message: {message}");
    assert!(server.runner().sessions().is_empty().await);
}

#[tokio::test]
async fn test_codex_start_uses_fallback_session_id() {
    let dir = TempDir::new().unwrap();
    let server = server_with_script(
        &dir,
        &format!("echo 'codex session id: {THREAD_ID}'\necho 'done'\n"),
    );

    let responses = serve(&server, &format!("{}\n", call(2, "codex", json!({"prompt": "hi"})))).await;

    let content = responses[0]["result"]["content"].as_array().unwrap();
    assert_eq!(content[1]["text"], format!("[SESSION_ID: {THREAD_ID}]"));
    assert!(content[0]["text"].as_str().unwrap().ends_with("done"));
}

#[tokio::test]
async fn test_codex_reply_returns_raw_output() {
    let dir = TempDir::new().unwrap();
    let server = server_with_script(&dir, "echo ok\n");

    let responses = serve(
        &server,
        &format!(
            "{}\n",
            call(4, "codex-reply", json!({"conversationId": "abc", "prompt": "go on"}))
        ),
    )
    .await;

    assert_eq!(responses.len(), 1);
    let content = responses[0]["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["text"], "ok");
}

#[tokio::test]
async fn test_calls_are_answered_in_order() {
    let dir = TempDir::new().unwrap();
    let server = server_with_script(&dir, "echo \"$4\"\n");

    let input = format!(
        "{}\n{}\n",
        call(1, "codex-reply", json!({"conversationId": "a", "prompt": "first"})),
        call(2, "codex-reply", json!({"conversationId": "a", "prompt": "second"})),
    );
    let responses = serve(&server, &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["content"][0]["text"], "first");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["content"][0]["text"], "second");
}
