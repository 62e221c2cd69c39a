//! Event types of the `codex exec --json` stream and their fold.
//!
//! Codex writes one JSON object per line. Only two shapes matter here:
//! `thread.started`, which names the conversation, and `item.completed`,
//! whose `agent_message` items carry the human-facing answer. Everything
//! else, including lines that are not JSON, is skipped.

use serde::Deserialize;
use tracing::trace;

use codex_mcp_core::SessionId;

/// Item type whose text is the agent's answer.
pub const AGENT_MESSAGE: &str = "agent_message";

/// One parsed line of codex output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ExecEvent {
    /// Conversation created
    #[serde(rename = "thread.started")]
    ThreadStarted {
        /// Conversation identifier
        thread_id: String,
    },
    /// An item (message, command, file change...) finished
    #[serde(rename = "item.completed")]
    ItemCompleted {
        /// The finished item
        item: ExecItem,
    },
    /// Any other event type
    #[serde(other)]
    Other,
}

/// Payload of an `item.completed` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecItem {
    /// Item type, e.g. `agent_message` or `reasoning`
    #[serde(rename = "type")]
    pub kind: String,
    /// Text for message-like items
    #[serde(default)]
    pub text: Option<String>,
}

impl ExecEvent {
    /// Parse one line. Blank lines and anything that is not an event object
    /// yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        serde_json::from_str(line).ok()
    }
}

/// Running fold over codex stdout.
///
/// The session id is the first `thread.started` seen; the text is the last
/// `agent_message`. The raw output is retained verbatim for the fallbacks.
#[derive(Debug, Default)]
pub struct EventFold {
    session_id: Option<SessionId>,
    last_message: Option<String>,
    raw: String,
    events: usize,
}

impl EventFold {
    /// Create an empty fold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line of output (terminator included) and fold it if it is an
    /// event.
    pub fn push_line(&mut self, line: &str) {
        self.raw.push_str(line);
        match ExecEvent::parse_line(line) {
            Some(event) => self.apply(event),
            None => trace!("Skipping non-event line ({} bytes)", line.len()),
        }
    }

    /// Record output without attempting to parse it.
    pub fn push_raw(&mut self, chunk: &str) {
        self.raw.push_str(chunk);
    }

    /// Apply one event.
    pub fn apply(&mut self, event: ExecEvent) {
        self.events += 1;
        match event {
            ExecEvent::ThreadStarted { thread_id } => {
                if self.session_id.is_none() {
                    self.session_id = Some(SessionId::from(thread_id));
                }
            }
            ExecEvent::ItemCompleted { item } if item.kind == AGENT_MESSAGE => {
                if let Some(text) = item.text {
                    self.last_message = Some(text);
                }
            }
            ExecEvent::ItemCompleted { .. } | ExecEvent::Other => {}
        }
    }

    /// Session id seen so far.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Raw output captured so far.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of parsed events, recognized or not.
    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Finish the fold.
    pub fn finish(self) -> FoldOutcome {
        let text = match self.last_message {
            Some(message) => message,
            None => self.raw.trim().to_string(),
        };
        FoldOutcome {
            session_id: self.session_id,
            text,
            raw: self.raw,
        }
    }
}

/// Result of folding a complete stdout stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldOutcome {
    /// First `thread.started` id, if any
    pub session_id: Option<SessionId>,
    /// Last agent message, or the whole raw output when there was none
    pub text: String,
    /// Complete raw output
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const THREAD: &str =
        r#"{"type":"thread.started","thread_id":"11111111-1111-1111-1111-111111111111"}"#;
    const HELLO: &str = r#"{"type":"item.completed","item":{"type":"agent_message","text":"hello"}}"#;

    #[test]
    fn test_parse_thread_started() {
        let event = ExecEvent::parse_line(THREAD).unwrap();
        assert_eq!(
            event,
            ExecEvent::ThreadStarted {
                thread_id: "11111111-1111-1111-1111-111111111111".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_event_type() {
        let event = ExecEvent::parse_line(r#"{"type":"turn.started"}"#).unwrap();
        assert_eq!(event, ExecEvent::Other);
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert_eq!(ExecEvent::parse_line(""), None);
        assert_eq!(ExecEvent::parse_line("   "), None);
        assert_eq!(ExecEvent::parse_line("Reading prompt from stdin..."), None);
        assert_eq!(ExecEvent::parse_line("[1, 2, 3]"), None);
        assert_eq!(ExecEvent::parse_line(r#"{"no_type": true}"#), None);
    }

    #[test]
    fn test_fold_scenario() {
        let mut fold = EventFold::new();
        fold.push_line(&format!("{THREAD}\n"));
        fold.push_line(&format!("{HELLO}\n"));
        let outcome = fold.finish();
        assert_eq!(
            outcome.session_id,
            Some(SessionId::from("11111111-1111-1111-1111-111111111111"))
        );
        assert_eq!(outcome.text, "hello");
    }

    #[test]
    fn test_fold_first_thread_wins() {
        let mut fold = EventFold::new();
        fold.push_line(r#"{"type":"thread.started","thread_id":"first"}"#);
        fold.push_line(r#"{"type":"thread.started","thread_id":"second"}"#);
        assert_eq!(fold.session_id(), Some(&SessionId::from("first")));
    }

    #[test]
    fn test_fold_last_agent_message_wins() {
        let mut fold = EventFold::new();
        fold.push_line(r#"{"type":"item.completed","item":{"type":"agent_message","text":"one"}}"#);
        fold.push_line(r#"{"type":"item.completed","item":{"type":"reasoning","text":"thinking"}}"#);
        fold.push_line(r#"{"type":"item.completed","item":{"type":"agent_message","text":"two"}}"#);
        fold.push_line(r#"{"type":"item.completed","item":{"type":"command_execution","command":"ls"}}"#);
        assert_eq!(fold.finish().text, "two");
    }

    #[test]
    fn test_fold_falls_back_to_raw_output() {
        let mut fold = EventFold::new();
        fold.push_line("plain text answer\n");
        fold.push_line(&format!("{THREAD}\n"));
        let outcome = fold.finish();
        assert_eq!(outcome.text, format!("plain text answer\n{THREAD}"));
        assert!(outcome.session_id.is_some());
    }

    #[test]
    fn test_push_raw_is_not_parsed() {
        let mut fold = EventFold::new();
        fold.push_raw(&format!("{THREAD}\n"));
        assert_eq!(fold.session_id(), None);
        assert_eq!(fold.event_count(), 0);
        assert_eq!(fold.raw(), format!("{THREAD}\n"));
    }

    #[test]
    fn test_event_count_includes_unrecognized() {
        let mut fold = EventFold::new();
        fold.push_line(r#"{"type":"turn.started"}"#);
        fold.push_line("noise");
        fold.push_line(HELLO);
        assert_eq!(fold.event_count(), 2);
    }
}
