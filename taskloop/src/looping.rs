//! Multi-iteration agent loop for `taskloop run`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::agents::{Agent, InvokeRequest};
use crate::io::git::Git;
use crate::io::run_log;
use crate::io::task_store::{self, TaskDocument};

const BANNER_WIDTH: usize = 60;

/// Resolved options for one `taskloop run` invocation.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    pub prompt_file: PathBuf,
    pub tasks_file: PathBuf,
    pub max_iterations: u32,
    /// Skip all agent permission prompts.
    pub yolo: bool,
    pub allow_paths: Option<String>,
    /// Reuse the agent conversation from the second iteration on.
    pub continue_session: bool,
    /// Keep iterating even when no unchecked tasks remain.
    pub keep_running: bool,
    pub dry_run: bool,
    pub log_file: Option<PathBuf>,
    /// Show worktree changes via git status after each iteration.
    pub verbose: bool,
}

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// No unchecked tasks remain.
    Complete,
    /// The configured iteration limit was reached.
    MaxIterations,
    /// Dry run: the command line was printed, nothing executed.
    DryRun,
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub iterations_run: u32,
    pub stop: LoopStop,
}

/// Feed the prompt file to the agent repeatedly until the task document has
/// no unchecked tasks left or `max_iterations` is reached.
///
/// The agent edits the task document itself; the loop only re-reads it for
/// the stop condition. Invocation errors (missing executable, spawn failure)
/// abort the loop; a nonzero agent exit does not.
pub fn run_loop(agent: &dyn Agent, options: &LoopOptions) -> Result<LoopOutcome> {
    let prompt = fs::read_to_string(&options.prompt_file)
        .with_context(|| format!("read prompt file {}", options.prompt_file.display()))?;

    if options.dry_run {
        print_dry_run(agent, options, &prompt);
        return Ok(LoopOutcome {
            iterations_run: 0,
            stop: LoopStop::DryRun,
        });
    }

    let banner = "=".repeat(BANNER_WIDTH);
    let mut iterations_run = 0u32;

    for i in 1..=options.max_iterations {
        if stop_when_done(options)? {
            println!(
                "\nAll tasks in {} are complete. Exiting.",
                options.tasks_file.display()
            );
            return Ok(LoopOutcome {
                iterations_run,
                stop: LoopStop::Complete,
            });
        }

        println!("\n{banner}");
        println!("Iteration {i}/{}", options.max_iterations);
        if let Some(task) = current_task(&options.tasks_file)? {
            println!("Current task: {task}");
        }
        println!("{banner}\n");

        let request = InvokeRequest {
            prompt: prompt.clone(),
            yolo: options.yolo,
            allow_paths: options.allow_paths.clone(),
            continue_session: options.continue_session && i > 1,
        };
        let invocation = agent.invoke(&request)?;
        iterations_run = i;

        if !invocation.stdout.is_empty() {
            println!("{}", invocation.stdout);
        }
        if !invocation.stderr.is_empty() {
            eprintln!("{}", invocation.stderr);
        }
        if !invocation.status.success() {
            warn!(exit_code = ?invocation.status.code(), "agent exited nonzero, continuing");
        }

        if let Some(log_file) = &options.log_file {
            run_log::append_entry(log_file, i, &invocation.stdout)?;
        }
        if options.verbose {
            println!("\n--- File Changes ---");
            println!("{}", Git::new(".").change_summary());
        }

        if stop_when_done(options)? {
            println!(
                "\nAll tasks in {} are complete. Exiting.",
                options.tasks_file.display()
            );
            return Ok(LoopOutcome {
                iterations_run,
                stop: LoopStop::Complete,
            });
        }
    }

    println!("\n{banner}");
    println!("Loop completed");
    println!("{banner}");
    Ok(LoopOutcome {
        iterations_run,
        stop: LoopStop::MaxIterations,
    })
}

fn stop_when_done(options: &LoopOptions) -> Result<bool> {
    if options.keep_running {
        return Ok(false);
    }
    Ok(!task_store::tasks_remaining(&options.tasks_file)?)
}

fn current_task(tasks_file: &Path) -> Result<Option<String>> {
    if !tasks_file.exists() {
        return Ok(None);
    }
    Ok(TaskDocument::load(tasks_file)?.current_task())
}

fn print_dry_run(agent: &dyn Agent, options: &LoopOptions, prompt: &str) {
    let request = InvokeRequest {
        prompt: prompt.to_string(),
        yolo: options.yolo,
        allow_paths: options.allow_paths.clone(),
        continue_session: false,
    };
    println!("Would run {} iterations", options.max_iterations);
    println!("Agent: {}", agent.name());
    println!("Command: {}", agent.argv(&request).join(" "));
    println!("Stop condition: tasks (check {})", options.tasks_file.display());
    if options.keep_running {
        println!("Task completion mode: keep running (continue for all iterations)");
    } else {
        println!("Task completion mode: stop when done (exit when tasks complete)");
    }
    if options.continue_session {
        println!("Session mode: continue (reuse conversation after first iteration)");
    } else {
        println!("Session mode: reset (fresh session each iteration)");
    }
    if let Some(log_file) = &options.log_file {
        println!("Log file: {}", log_file.display());
    }
    if options.verbose {
        println!("Progress tracking: enabled (will show file changes via git status)");
    }
    println!("Prompt:\n---\n{prompt}\n---");
}
