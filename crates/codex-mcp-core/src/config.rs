//! Configuration types for Codex MCP Server.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Server configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
    /// How to launch the codex agent
    pub codex: CodexSettings,
    /// Session table settings
    pub sessions: SessionSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.transport != "stdio" {
            return Err(Error::Config(format!(
                "server.transport '{}' is not supported (expected 'stdio')",
                self.server.transport
            )));
        }

        if self.codex.command.trim().is_empty() {
            return Err(Error::Config("codex.command cannot be empty".to_string()));
        }

        if self.sessions.max_sessions == 0 {
            return Err(Error::Config(
                "sessions.max_sessions must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Transport type (only stdio)
    pub transport: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Settings for launching the codex executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodexSettings {
    /// Executable to run, resolved through PATH
    pub command: String,
    /// Arguments placed before the `exec` subcommand (e.g. a launcher script)
    pub args: Vec<String>,
    /// Invocation deadline in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for CodexSettings {
    fn default() -> Self {
        Self {
            command: "codex".to_string(),
            args: vec![],
            timeout_secs: 1800,
        }
    }
}

/// Session table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Maximum number of remembered sessions; the oldest is evicted beyond it
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}
