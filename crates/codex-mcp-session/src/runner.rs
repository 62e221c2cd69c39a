//! Codex process runner.
//!
//! Spawns `codex exec`, streams its stdout line by line, forwards its stderr
//! to the log, and settles once the process exits. Invocations go through a
//! single slot: concurrent callers wait in arrival order.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use codex_mcp_core::{Error, Result, ServerConfig, SessionId, SessionRecord};

use crate::command::{CodexCommand, ResumeRequest, StartRequest};
use crate::events::EventFold;
use crate::fallback::scan_session_id;
use crate::table::SessionTable;

/// How long to keep forwarding stderr once codex has exited.
const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Configuration for the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Executable to launch
    pub command: String,

    /// Arguments placed before the `exec` subcommand
    pub args: Vec<String>,

    /// Deadline for a single invocation (None = wait forever)
    pub timeout: Option<Duration>,

    /// Session table bound
    pub max_sessions: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_server_config(&ServerConfig::default())
    }
}

impl RunnerConfig {
    /// Derive runner settings from the server configuration.
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            command: config.codex.command.clone(),
            args: config.codex.args.clone(),
            timeout: match config.codex.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            max_sessions: config.sessions.max_sessions,
        }
    }
}

/// Result of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// Conversation id reported by codex
    pub session_id: SessionId,
    /// Final agent message, or the raw output if there was none
    pub text: String,
}

/// Result of a successful resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeOutcome {
    /// Raw codex output
    pub text: String,
}

/// Runs codex invocations and owns the session table.
#[derive(Debug)]
pub struct CodexRunner {
    config: RunnerConfig,
    sessions: SessionTable,
    slot: Mutex<()>,
}

impl CodexRunner {
    /// Create a runner with default configuration.
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            sessions: SessionTable::new(config.max_sessions),
            config,
            slot: Mutex::new(()),
        }
    }

    /// Runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Sessions started through this runner.
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Start a new conversation.
    ///
    /// Fails with `ExternalProcessFailed` on a non-zero exit and with
    /// `SessionIdMissing` when neither the event stream nor the raw output
    /// names a session. Only a successful start is recorded in the table.
    #[instrument(skip_all)]
    pub async fn start(&self, request: StartRequest) -> Result<StartOutcome> {
        let command = CodexCommand::start(&self.config.command, &self.config.args, &request);
        let _slot = self.slot.lock().await;

        info!(
            "Starting codex: sandbox={:?}, model={:?}, cwd={:?}, prompt={} chars",
            request.sandbox,
            request.model,
            request.cwd,
            request.prompt.chars().count()
        );

        let fold = self.execute(&command, true).await?;
        let event_count = fold.event_count();
        let outcome = fold.finish();

        let session_id = match outcome.session_id {
            Some(id) => id,
            None => {
                debug!(
                    "No thread.started event among {} events, scanning raw output",
                    event_count
                );
                scan_session_id(&outcome.raw).ok_or_else(|| {
                    error!("Codex exited successfully but reported no session id");
                    Error::SessionIdMissing
                })?
            }
        };

        if !session_id.is_uuid_shaped() {
            debug!("Session id {} is not UUID-shaped", session_id);
        }

        self.sessions
            .insert(SessionRecord::new(session_id.clone(), request.prompt))
            .await;

        info!(
            "Codex session started: session_id={}, result={} chars",
            session_id,
            outcome.text.chars().count()
        );

        Ok(StartOutcome {
            session_id,
            text: outcome.text,
        })
    }

    /// Continue an existing conversation. The raw output is the result.
    #[instrument(skip_all)]
    pub async fn resume(&self, request: ResumeRequest) -> Result<ResumeOutcome> {
        let command = CodexCommand::resume(&self.config.command, &self.config.args, &request);
        let _slot = self.slot.lock().await;

        if self.sessions.contains(&request.session_id).await {
            info!("Resuming codex session {}", request.session_id);
        } else {
            info!(
                "Resuming codex session {} (not started by this server)",
                request.session_id
            );
        }

        let fold = self.execute(&command, false).await?;
        let text = fold.raw().trim().to_string();

        info!(
            "Codex session {} resumed: result={} chars",
            request.session_id,
            text.chars().count()
        );

        Ok(ResumeOutcome { text })
    }

    /// Spawn, stream stdout into a fold, wait for exit.
    async fn execute(&self, command: &CodexCommand, parse_events: bool) -> Result<EventFold> {
        debug!("Spawning {} {:?}", command.program, command.args);

        let mut child = command.to_command().spawn().map_err(|source| {
            error!("Failed to spawn {}: {}", command.program, source);
            Error::Spawn {
                program: command.program.clone(),
                source,
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Other("codex stdout was not captured".to_string()))?;
        let stderr_task = child.stderr.take().map(forward_stderr);

        let collected = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, collect(&mut child, stdout, parse_events))
                .await
                .ok(),
            None => Some(collect(&mut child, stdout, parse_events).await),
        };

        let Some(collected) = collected else {
            let secs = self.config.timeout.map_or(0, |t| t.as_secs());
            warn!("Codex invocation exceeded {}s, killing it", secs);
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill codex: {}", e);
            }
            if let Some(task) = stderr_task {
                task.abort();
            }
            return Err(Error::Timeout(secs));
        };

        // A grandchild may hold stderr open after codex itself has exited.
        if let Some(mut task) = stderr_task {
            match tokio::time::timeout(STDERR_DRAIN, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("stderr forwarder ended abnormally: {}", e),
                Err(_) => {
                    debug!("codex stderr still open after exit, detaching");
                    task.abort();
                }
            }
        }

        let (fold, status) = collected?;
        if !status.success() {
            error!("Codex exited unsuccessfully: {}", status);
            return Err(Error::ExternalProcessFailed {
                code: status.code().into(),
            });
        }

        Ok(fold)
    }
}

impl Default for CodexRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Read stdout to EOF, then reap the child.
async fn collect(
    child: &mut Child,
    stdout: ChildStdout,
    parse_events: bool,
) -> Result<(EventFold, ExitStatus)> {
    let mut reader = BufReader::new(stdout);
    let mut fold = EventFold::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if parse_events {
            fold.push_line(&line);
        } else {
            fold.push_raw(&line);
        }
    }

    let status = child.wait().await?;
    Ok((fold, status))
}

/// Forward each stderr line to the log under the `codex_stderr` target.
fn forward_stderr<R>(stderr: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => info!(target: "codex_stderr", "{}", line),
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading codex stderr: {}", e);
                    break;
                }
            }
        }
    })
}
