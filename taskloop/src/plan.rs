//! Agent-assisted task planning for `taskloop plan`.
//!
//! Builds a planning prompt from the project goal and the current task
//! document, asks the agent for a task list through the retry coordinator,
//! and merges the result into the tasks file with duplicates suppressed.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::agents::{Agent, InvokeRequest};
use crate::core::directive::Constraints;
use crate::io::prompt;
use crate::io::task_store::TaskDocument;
use crate::retry::run_with_retry;

/// Goal used when the project has no README to infer one from.
pub const DEFAULT_GOAL: &str =
    "Analyze the codebase for refactoring and improvement opportunities";

/// Resolved options for one `taskloop plan` invocation.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub tasks_file: PathBuf,
    pub readme_file: PathBuf,
    pub yolo: bool,
    pub allow_paths: Option<String>,
    pub max_attempts: u32,
}

/// Summary of a plan invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub suggested: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Ask the agent for new tasks and merge them into the tasks file.
///
/// A valid directive with zero tasks is success with nothing added. Parse
/// failures are retried by the coordinator; retry exhaustion and a missing
/// agent executable propagate to the caller.
pub fn run_plan(agent: &dyn Agent, options: &PlanOptions) -> Result<PlanOutcome> {
    let readme = match fs::read_to_string(&options.readme_file) {
        Ok(contents) => {
            println!("Found {} - inferring goal from it.", options.readme_file.display());
            Some(contents)
        }
        Err(_) => None,
    };
    let goal = if readme.is_some() {
        "Infer the goal from the README below."
    } else {
        DEFAULT_GOAL
    };

    let mut doc = TaskDocument::load(&options.tasks_file)?;
    let existing = doc.existing_tasks_summary();
    let meta_prompt = prompt::meta_prompt(goal, readme.as_deref(), existing.as_deref())?;

    let request = InvokeRequest {
        prompt: meta_prompt,
        yolo: options.yolo,
        allow_paths: options.allow_paths.clone(),
        continue_session: false,
    };
    let parsed = run_with_retry(agent, &request, options.max_attempts)?;

    let suggested = parsed.directive.tasks.len();
    let mut added = 0usize;
    for task in &parsed.directive.tasks {
        if doc.merge_add(task) {
            added += 1;
        }
    }
    if added > 0 {
        doc.save(&options.tasks_file)?;
    }
    let skipped = suggested - added;
    info!(suggested, added, skipped, "plan merged");

    report_constraints(&parsed.directive.constraints);

    if suggested == 0 {
        println!("The agent suggested no new tasks.");
    } else {
        println!(
            "Added {added} task(s) to {} ({skipped} duplicate(s) skipped).",
            options.tasks_file.display()
        );
    }

    Ok(PlanOutcome {
        suggested,
        added,
        skipped,
    })
}

/// Constraints are advisory: shown to the operator, never applied silently.
fn report_constraints(constraints: &Constraints) {
    if constraints.security_mode.is_none()
        && constraints.allow_paths.is_none()
        && constraints.internet_access.is_none()
    {
        return;
    }
    println!("\nSuggested security constraints:");
    if let Some(mode) = &constraints.security_mode {
        println!("  Security mode: {mode}");
    }
    if let Some(paths) = &constraints.allow_paths {
        println!("  Allowed paths: {paths}");
    }
    if let Some(internet) = constraints.internet_access {
        println!("  Internet access: {internet}");
    }
}
