//! Test-only scripted agent backends.

use std::cell::RefCell;
use std::process::ExitStatus;

use anyhow::Result;

use crate::agents::{Agent, AgentInvocation, InvokeRequest};

/// Build an `ExitStatus` with the given exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

/// An agent that replays canned stdout strings instead of spawning a
/// process, recording each prompt it was given. Once the script runs out
/// it keeps returning empty output.
pub struct ScriptedAgent {
    outputs: RefCell<Vec<String>>,
    pub prompts: RefCell<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: RefCell::new(outputs.iter().map(ToString::to_string).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn install_hint(&self) -> &'static str {
        ""
    }

    fn argv(&self, request: &InvokeRequest) -> Vec<String> {
        vec!["scripted".to_string(), request.prompt.clone()]
    }

    fn invoke(&self, request: &InvokeRequest) -> Result<AgentInvocation> {
        self.prompts.borrow_mut().push(request.prompt.clone());
        let mut outputs = self.outputs.borrow_mut();
        let stdout = if outputs.is_empty() {
            String::new()
        } else {
            outputs.remove(0)
        };
        Ok(AgentInvocation {
            stdout,
            stderr: String::new(),
            status: exit_status(0),
        })
    }
}

/// An agent whose every invocation fails with the given message.
pub struct FailingAgent {
    pub message: &'static str,
}

impl Agent for FailingAgent {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn install_hint(&self) -> &'static str {
        ""
    }

    fn argv(&self, _request: &InvokeRequest) -> Vec<String> {
        vec!["failing".to_string()]
    }

    fn invoke(&self, _request: &InvokeRequest) -> Result<AgentInvocation> {
        anyhow::bail!("{}", self.message)
    }
}
