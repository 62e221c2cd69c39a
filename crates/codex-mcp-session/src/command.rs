//! Command-line construction for codex invocations.

use std::path::PathBuf;
use std::process::Stdio;

use codex_mcp_core::SessionId;
use tokio::process::Command;

/// Parameters of a new codex conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    /// Initial prompt
    pub prompt: String,
    /// Sandbox mode passed as `--sandbox`
    pub sandbox: Option<String>,
    /// Model passed as `-m`
    pub model: Option<String>,
    /// Working directory passed as `-C` and used as the process cwd
    pub cwd: Option<String>,
    /// Approval policy passed as a `-c approval_policy=` override
    pub approval_policy: Option<String>,
}

impl StartRequest {
    /// Create a request with only a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Parameters for continuing an existing conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeRequest {
    /// Conversation to continue
    pub session_id: SessionId,
    /// Follow-up prompt
    pub prompt: String,
}

/// A fully resolved codex command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodexCommand {
    /// Executable
    pub program: String,
    /// Arguments in order, launcher arguments first
    pub args: Vec<String>,
    /// Working directory for the child (None = inherit)
    pub cwd: Option<PathBuf>,
}

impl CodexCommand {
    /// `exec <prompt> [--sandbox S] [-m M] [-C DIR] [-c approval_policy=P] --json`
    ///
    /// The approval policy has no dedicated `exec` flag, so it travels as a
    /// `-c` config override on top of the plain `exec` flags.
    pub fn start(program: &str, launcher_args: &[String], request: &StartRequest) -> Self {
        let mut args = launcher_args.to_vec();
        args.push("exec".to_string());
        args.push(request.prompt.clone());

        if let Some(sandbox) = &request.sandbox {
            args.push("--sandbox".to_string());
            args.push(sandbox.clone());
        }
        if let Some(model) = &request.model {
            args.push("-m".to_string());
            args.push(model.clone());
        }
        if let Some(cwd) = &request.cwd {
            args.push("-C".to_string());
            args.push(cwd.clone());
        }
        if let Some(policy) = &request.approval_policy {
            args.push("-c".to_string());
            args.push(format!("approval_policy={policy}"));
        }
        args.push("--json".to_string());

        Self {
            program: program.to_string(),
            args,
            cwd: request.cwd.as_ref().map(PathBuf::from),
        }
    }

    /// `exec resume <session_id> <prompt>`
    pub fn resume(program: &str, launcher_args: &[String], request: &ResumeRequest) -> Self {
        let mut args = launcher_args.to_vec();
        args.extend([
            "exec".to_string(),
            "resume".to_string(),
            request.session_id.to_string(),
            request.prompt.clone(),
        ]);

        Self {
            program: program.to_string(),
            args,
            cwd: None,
        }
    }

    /// Build the tokio command: stdin closed, stdout/stderr piped, killed on drop.
    ///
    /// The environment is inherited unchanged.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}
