//! # Codex MCP Server
//!
//! Model Context Protocol server that lets MCP clients drive the `codex` CLI
//! agent.
//!
//! ## Overview
//!
//! This server provides two MCP tools:
//! - `codex`: start a new agent conversation, returning its final message
//!   and session id
//! - `codex-reply`: continue a conversation by session id
//!
//! ## Architecture
//!
//! This is Layer 2 - the server binary that ties together:
//! - codex-mcp-core: Core types, errors and configuration
//! - codex-mcp-session: Codex invocation and session tracking

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codex_mcp::CodexMcpServer;
use codex_mcp_core::ServerConfig;
use codex_mcp_session::{CodexRunner, RunnerConfig};

/// MCP server exposing the codex CLI agent over stdio.
#[derive(Debug, Parser)]
#[command(name = "codex-mcp", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "CODEX_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Executable used to launch codex
    #[arg(long)]
    codex_command: Option<String>,

    /// Per-invocation deadline in seconds (0 disables it)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(command) = &self.codex_command {
            config.codex.command = command.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.codex.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.server.log_level = level.clone();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // Initialize logging; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        "Codex MCP Server v{} starting (codex command: {}, timeout: {}s)",
        env!("CARGO_PKG_VERSION"),
        config.codex.command,
        config.codex.timeout_secs
    );

    let runner = Arc::new(CodexRunner::with_config(RunnerConfig::from_server_config(
        &config,
    )));
    let server = CodexMcpServer::with_runner(runner);

    tokio::select! {
        result = server.run() => {
            result.map_err(|e| {
                tracing::error!("Server stopped with error: {}", e);
                e
            })?;
            tracing::info!("Codex MCP Server shutting down");
        }
        signal = shutdown_signal() => {
            tracing::info!("Received {}, shutting down", signal);
            // The stdin reader blocks a runtime thread; leave without waiting for it.
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}
