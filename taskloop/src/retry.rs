//! Re-ask coordination for unparseable agent output.
//!
//! When an agent answers in prose instead of the expected task-list format,
//! the coordinator re-asks with a format hint that embeds the previous
//! output and the original prompt. Invocation failures (missing executable,
//! spawn errors) are never retried; only parse failures are.

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, warn};

use crate::agents::{Agent, InvokeRequest};
use crate::core::directive::{self, Directive};
use crate::core::extract;
use crate::io::prompt;

/// Total attempts (initial ask plus re-asks) before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Every attempt produced output that did not parse as a task list.
#[derive(Debug, Error)]
#[error("could not parse a task list from agent output after {attempts} attempts")]
pub struct RetryExhaustedError {
    pub attempts: u32,
}

/// A successfully parsed agent response.
#[derive(Debug)]
pub struct ParsedResponse {
    pub directive: Directive,
    /// The raw stdout the directive was parsed from.
    pub raw_output: String,
}

/// Ask the agent for a task list, re-asking with a format hint on parse
/// failure. The retry prompt always references the original prompt, not
/// the previous retry prompt.
pub fn run_with_retry(
    agent: &dyn Agent,
    request: &InvokeRequest,
    max_attempts: u32,
) -> Result<ParsedResponse> {
    let original_prompt = request.prompt.clone();
    let mut attempt_request = request.clone();

    for attempt in 1..=max_attempts {
        let invocation = agent.invoke(&attempt_request)?;
        if let Some(directive) = extract::extract(&invocation.stdout).and_then(directive::parse) {
            debug!(attempt, tasks = directive.tasks.len(), "parsed agent response");
            return Ok(ParsedResponse {
                directive,
                raw_output: invocation.stdout,
            });
        }
        warn!(attempt, max_attempts, "agent output was not a parseable task list");
        if attempt < max_attempts {
            attempt_request.prompt = prompt::retry_prompt(&original_prompt, &invocation.stdout)?;
        }
    }

    Err(anyhow::Error::new(RetryExhaustedError {
        attempts: max_attempts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingAgent, ScriptedAgent};

    const VALID_OUTPUT: &str = "```markdown\n## Tasks\n\n- [ ] Task 1\n- [ ] Task 2\n```";
    const INVALID_OUTPUT: &str = "I couldn't understand the codebase";

    #[test]
    fn succeeds_on_first_parseable_response() {
        let agent = ScriptedAgent::new(&[VALID_OUTPUT]);
        let parsed = run_with_retry(&agent, &InvokeRequest::new("plan"), DEFAULT_MAX_ATTEMPTS)
            .expect("parse");
        assert_eq!(parsed.directive.tasks, vec!["Task 1", "Task 2"]);
        assert_eq!(agent.call_count(), 1);
    }

    #[test]
    fn retries_once_on_unparseable_output() {
        let agent = ScriptedAgent::new(&[INVALID_OUTPUT, VALID_OUTPUT]);
        let parsed = run_with_retry(&agent, &InvokeRequest::new("plan"), DEFAULT_MAX_ATTEMPTS)
            .expect("parse");
        assert_eq!(parsed.directive.tasks, vec!["Task 1", "Task 2"]);
        assert_eq!(agent.call_count(), 2);
    }

    #[test]
    fn retry_prompt_carries_format_hint_and_original_prompt() {
        let agent = ScriptedAgent::new(&[INVALID_OUTPUT, VALID_OUTPUT]);
        run_with_retry(&agent, &InvokeRequest::new("plan the work"), DEFAULT_MAX_ATTEMPTS)
            .expect("parse");

        let prompts = agent.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("```markdown"));
        assert!(prompts[1].contains("## Tasks"));
        assert!(prompts[1].contains("- [ ]"));
        assert!(prompts[1].contains(INVALID_OUTPUT));
        assert!(prompts[1].contains("plan the work"));
    }

    #[test]
    fn second_retry_still_references_the_original_prompt() {
        let agent = ScriptedAgent::new(&[INVALID_OUTPUT, INVALID_OUTPUT, VALID_OUTPUT]);
        run_with_retry(&agent, &InvokeRequest::new("the original ask"), DEFAULT_MAX_ATTEMPTS)
            .expect("parse");

        let prompts = agent.prompts.borrow();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("the original ask"));
        // Not a retry-of-a-retry: the hint boilerplate appears once per level
        // but the original ask is always embedded directly.
        assert!(prompts[2].contains(INVALID_OUTPUT));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let agent = ScriptedAgent::new(&[INVALID_OUTPUT, INVALID_OUTPUT, INVALID_OUTPUT]);
        let err = run_with_retry(&agent, &InvokeRequest::new("plan"), 3).unwrap_err();
        let exhausted = err
            .downcast_ref::<RetryExhaustedError>()
            .expect("retry exhausted error");
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(agent.call_count(), 3);
    }

    #[test]
    fn invocation_failure_is_never_retried() {
        let agent = FailingAgent {
            message: "agent CLI not found",
        };
        let err =
            run_with_retry(&agent, &InvokeRequest::new("plan"), DEFAULT_MAX_ATTEMPTS).unwrap_err();
        assert!(err.to_string().contains("agent CLI not found"));
        assert!(err.downcast_ref::<RetryExhaustedError>().is_none());
    }

    #[test]
    fn empty_output_counts_as_a_parse_failure() {
        let agent = ScriptedAgent::new(&["", VALID_OUTPUT]);
        let parsed = run_with_retry(&agent, &InvokeRequest::new("plan"), DEFAULT_MAX_ATTEMPTS)
            .expect("parse");
        assert_eq!(parsed.directive.tasks.len(), 2);
        assert_eq!(agent.call_count(), 2);
    }
}
