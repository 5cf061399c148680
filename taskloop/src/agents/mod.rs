//! Agent abstraction for external coding assistants.
//!
//! The [`Agent`] trait decouples the loop and the retry coordinator from the
//! actual agent backend (claude, codex, gemini). The set of backends is a
//! fixed [`AgentKind`] enumeration resolved at startup; tests use scripted
//! agents that return predetermined output without spawning processes.

mod claude;
mod codex;
mod gemini;

use std::process::{Command, ExitStatus};

use anyhow::{Result, anyhow};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use claude::ClaudeAgent;
pub use codex::CodexAgent;
pub use gemini::GeminiAgent;

use crate::io::process::run_command;

/// Truncate captured agent output beyond this many bytes.
const OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// The agent executable is not installed or not on PATH. Never retried.
#[derive(Debug, Error)]
#[error("'{name}' command not found. {hint}")]
pub struct MissingAgentError {
    pub name: &'static str,
    pub hint: &'static str,
}

/// Parameters for one agent invocation.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Prompt text to feed to the agent.
    pub prompt: String,
    /// Skip all permission prompts.
    pub yolo: bool,
    /// Verbatim comma-separated paths the agent may write to.
    pub allow_paths: Option<String>,
    /// Reuse the previous conversation where the backend supports it.
    pub continue_session: bool,
}

impl InvokeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            yolo: false,
            allow_paths: None,
            continue_session: false,
        }
    }
}

/// Captured result of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Abstraction over agent backends.
pub trait Agent {
    fn name(&self) -> &'static str;

    /// Installation hint shown when the executable is missing.
    fn install_hint(&self) -> &'static str;

    /// Full argv (program first) for the given request.
    fn argv(&self, request: &InvokeRequest) -> Vec<String>;

    /// Run the agent once and capture its output. A missing executable is
    /// reported as [`MissingAgentError`]; it must stay distinguishable from
    /// a valid zero-task response.
    fn invoke(&self, request: &InvokeRequest) -> Result<AgentInvocation> {
        invoke_argv(self.name(), self.install_hint(), &self.argv(request))
    }
}

#[instrument(skip_all, fields(agent = name))]
fn invoke_argv(name: &'static str, hint: &'static str, argv: &[String]) -> Result<AgentInvocation> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("agent '{name}' produced an empty command line"))?;
    let mut cmd = Command::new(program);
    cmd.args(args);

    let output = run_command(cmd, OUTPUT_LIMIT_BYTES).map_err(|err| {
        match err.downcast_ref::<std::io::Error>() {
            Some(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                anyhow::Error::new(MissingAgentError { name, hint })
            }
            _ => err,
        }
    })?;

    if !output.status.success() {
        warn!(exit_code = ?output.status.code(), "agent exited with failure");
    }
    debug!(stdout_bytes = output.stdout.len(), "agent invocation finished");
    Ok(AgentInvocation {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status,
    })
}

/// The fixed set of supported agent backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Claude,
    Codex,
    Gemini,
}

impl AgentKind {
    pub const DEFAULT: AgentKind = AgentKind::Claude;

    pub fn available() -> [&'static str; 3] {
        ["claude", "codex", "gemini"]
    }

    /// Resolve a backend by name; `None` selects the default (claude).
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Self::DEFAULT),
            Some("claude") => Ok(AgentKind::Claude),
            Some("codex") => Ok(AgentKind::Codex),
            Some("gemini") => Ok(AgentKind::Gemini),
            Some(other) => Err(anyhow!(
                "unknown agent '{other}'. Available agents: {}",
                Self::available().join(", ")
            )),
        }
    }

    pub fn agent(self) -> Box<dyn Agent> {
        match self {
            AgentKind::Claude => Box::new(ClaudeAgent),
            AgentKind::Codex => Box::new(CodexAgent),
            AgentKind::Gemini => Box::new(GeminiAgent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_defaults_to_claude() {
        assert_eq!(AgentKind::from_name(None).expect("resolve"), AgentKind::Claude);
    }

    #[test]
    fn from_name_resolves_each_backend() {
        for (name, expected) in [
            ("claude", AgentKind::Claude),
            ("codex", AgentKind::Codex),
            ("gemini", AgentKind::Gemini),
        ] {
            assert_eq!(AgentKind::from_name(Some(name)).expect("resolve"), expected);
        }
    }

    #[test]
    fn from_name_rejects_unknown_with_available_list() {
        let err = AgentKind::from_name(Some("copilot")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown agent 'copilot'"));
        assert!(msg.contains("claude, codex, gemini"));
    }

    #[test]
    fn missing_executable_is_reported_as_missing_agent() {
        struct GhostAgent;
        impl Agent for GhostAgent {
            fn name(&self) -> &'static str {
                "ghost"
            }
            fn install_hint(&self) -> &'static str {
                "Install ghost first."
            }
            fn argv(&self, _request: &InvokeRequest) -> Vec<String> {
                vec!["taskloop-test-no-such-executable".to_string()]
            }
        }

        let err = GhostAgent
            .invoke(&InvokeRequest::new("hello"))
            .unwrap_err();
        let missing = err
            .downcast_ref::<MissingAgentError>()
            .expect("missing agent error");
        assert_eq!(missing.name, "ghost");
    }
}
