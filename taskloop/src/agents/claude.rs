//! Claude Code CLI backend.

use super::{Agent, InvokeRequest};

pub struct ClaudeAgent;

impl Agent for ClaudeAgent {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn install_hint(&self) -> &'static str {
        "Is Claude Code installed?"
    }

    fn argv(&self, request: &InvokeRequest) -> Vec<String> {
        let mut argv = vec![
            "claude".to_string(),
            "--print".to_string(),
            "-p".to_string(),
            request.prompt.clone(),
        ];
        if request.continue_session {
            argv.push("-c".to_string());
        }
        if request.yolo {
            argv.push("--dangerously-skip-permissions".to_string());
        }
        if let Some(paths) = &request.allow_paths {
            for path in paths.split(',') {
                let path = path.trim();
                argv.push("--allowedTools".to_string());
                argv.push(format!("Edit:{path}*"));
                argv.push("--allowedTools".to_string());
                argv.push(format!("Write:{path}*"));
            }
        }
        argv
    }
}
