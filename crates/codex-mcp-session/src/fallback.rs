//! Last-resort session id recovery from unstructured output.
//!
//! Only used when codex exits successfully without a parseable
//! `thread.started` event. Every hit is logged at `warn` so a regression in
//! the structured stream shows up in the server logs.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use codex_mcp_core::SessionId;

lazy_static! {
    /// A UUID after a `thread_id`, `session_id` or `session id` key, with
    /// optional quotes and a `:` or `=` separator.
    static ref SESSION_ID_PATTERN: Regex = Regex::new(
        r#"(?i)"?(?:thread_id|session_id|session id)"?\s*[:=]\s*"?([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})"#
    )
    .expect("session id pattern is valid");
}

/// Scan raw output for the first UUID-shaped token following a key marker.
pub fn scan_session_id(raw: &str) -> Option<SessionId> {
    let found = SESSION_ID_PATTERN
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| SessionId::from(m.as_str()));

    if let Some(id) = &found {
        warn!(
            "Session id {} recovered from unstructured codex output; structured thread.started event was missing",
            id
        );
    }
    found
}
