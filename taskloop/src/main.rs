//! Agent loop CLI over a markdown task document.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};

use taskloop::agents::{AgentKind, MissingAgentError};
use taskloop::exit_codes;
use taskloop::io::config::{self, Config};
use taskloop::io::init::{InitOptions, init_loop};
use taskloop::io::task_store::TaskDocument;
use taskloop::logging;
use taskloop::looping::{LoopOptions, run_loop};
use taskloop::plan::{PlanOptions, run_plan};
use taskloop::retry::{DEFAULT_MAX_ATTEMPTS, RetryExhaustedError};

#[derive(Parser)]
#[command(
    name = "taskloop",
    version,
    about = "Drive a coding agent in a loop over a markdown task list"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the agent loop. Stops when all tasks in the tasks file are complete.
    Run(RunArgs),
    /// Ask the agent to suggest tasks and merge them into the tasks file.
    Plan(PlanArgs),
    /// Add a task to the tasks file (duplicates are skipped).
    Add(AddArgs),
    /// Remove completed items from the Done section.
    ClearDone(ClearDoneArgs),
    /// Write LOOP-PROMPT.md, TASKS.md and .taskloop.toml scaffolding.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Prompt file (default: LOOP-PROMPT.md)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,
    /// Tasks file for the stop condition
    #[arg(long)]
    tasks: Option<PathBuf>,
    /// Max iterations
    #[arg(short = 'n', long)]
    max_iterations: Option<u32>,
    /// Agent to use (claude, codex, gemini)
    #[arg(long)]
    agent: Option<String>,
    /// Skip all permission prompts (default: enabled)
    #[arg(long, overrides_with = "no_yolo")]
    yolo: bool,
    /// Keep permission prompts enabled
    #[arg(long)]
    no_yolo: bool,
    /// Comma-separated paths to allow writing (e.g. 'src/,tests/')
    #[arg(long)]
    allow_paths: Option<String>,
    /// Maintain conversation context between iterations
    #[arg(long = "continue", conflicts_with = "reset")]
    continue_session: bool,
    /// Start fresh each iteration (default behavior)
    #[arg(long)]
    reset: bool,
    /// Continue running even when all tasks are complete
    #[arg(long, conflicts_with = "stop_when_done")]
    keep_running: bool,
    /// Stop when all tasks are complete (default behavior)
    #[arg(long)]
    stop_when_done: bool,
    /// Show what would run without invoking the agent
    #[arg(long)]
    dry_run: bool,
    /// Log each iteration's output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Show file changes (via git status) after each iteration
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Args)]
struct PlanArgs {
    /// Tasks file to merge suggestions into
    #[arg(long)]
    tasks: Option<PathBuf>,
    /// Agent to use (claude, codex, gemini)
    #[arg(long)]
    agent: Option<String>,
    /// Skip all permission prompts (default: enabled)
    #[arg(long, overrides_with = "no_yolo")]
    yolo: bool,
    /// Keep permission prompts enabled
    #[arg(long)]
    no_yolo: bool,
    /// Comma-separated paths to allow writing
    #[arg(long)]
    allow_paths: Option<String>,
}

#[derive(Args)]
struct AddArgs {
    /// Task description
    description: String,
    /// Tasks file to add to
    #[arg(long)]
    tasks: Option<PathBuf>,
}

#[derive(Args)]
struct ClearDoneArgs {
    /// Tasks file to clear
    #[arg(long)]
    tasks: Option<PathBuf>,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<MissingAgentError>().is_some() {
        exit_codes::AGENT_MISSING
    } else if err.downcast_ref::<RetryExhaustedError>().is_some() {
        exit_codes::RETRY_EXHAUSTED
    } else {
        exit_codes::INVALID
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    dispatch(cli.command)
}

/// Config is loaded per subcommand: `init` must keep working when an
/// existing `.taskloop.toml` is malformed, since it is the command that
/// rewrites the scaffolding.
fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => cmd_run(&args, &load_config()?),
        Command::Plan(args) => cmd_plan(&args, &load_config()?),
        Command::Add(args) => cmd_add(&args, &load_config()?),
        Command::ClearDone(args) => cmd_clear_done(&args, &load_config()?),
        Command::Init { force } => cmd_init(force),
    }
}

fn load_config() -> Result<Config> {
    config::load_config(Path::new(config::CONFIG_FILE))
}

/// Fold a `--flag`/`--no-flag` pair into an explicit tri-state.
fn tri_state(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn cmd_run(args: &RunArgs, cfg: &Config) -> Result<()> {
    let agent_name = config::resolve_agent(args.agent.as_deref(), cfg);
    let agent = AgentKind::from_name(agent_name.as_deref())?.agent();

    let options = LoopOptions {
        prompt_file: config::resolve_prompt_file(args.file.as_deref(), cfg),
        tasks_file: config::resolve_tasks_file(args.tasks.as_deref(), cfg),
        max_iterations: config::resolve_max_iterations(args.max_iterations, cfg),
        yolo: config::resolve_yolo(tri_state(args.yolo, args.no_yolo), cfg),
        allow_paths: config::resolve_allow_paths(args.allow_paths.as_deref(), cfg),
        continue_session: config::resolve_continue_session(
            tri_state(args.continue_session, args.reset),
            cfg,
        ),
        keep_running: config::resolve_keep_running(
            tri_state(args.keep_running, args.stop_when_done),
            cfg,
        ),
        dry_run: args.dry_run,
        log_file: config::resolve_log_file(args.log_file.as_deref(), cfg),
        verbose: config::resolve_verbose(args.verbose, cfg),
    };
    run_loop(agent.as_ref(), &options)?;
    Ok(())
}

fn cmd_plan(args: &PlanArgs, cfg: &Config) -> Result<()> {
    let agent_name = config::resolve_agent(args.agent.as_deref(), cfg);
    let agent = AgentKind::from_name(agent_name.as_deref())?.agent();

    let options = PlanOptions {
        tasks_file: config::resolve_tasks_file(args.tasks.as_deref(), cfg),
        readme_file: PathBuf::from("README.md"),
        yolo: config::resolve_yolo(tri_state(args.yolo, args.no_yolo), cfg),
        allow_paths: config::resolve_allow_paths(args.allow_paths.as_deref(), cfg),
        max_attempts: DEFAULT_MAX_ATTEMPTS,
    };
    run_plan(agent.as_ref(), &options)?;
    Ok(())
}

fn cmd_add(args: &AddArgs, cfg: &Config) -> Result<()> {
    let description = args.description.trim();
    if description.is_empty() {
        return Err(anyhow!("task description must not be blank"));
    }
    let tasks_file = config::resolve_tasks_file(args.tasks.as_deref(), cfg);
    let mut doc = TaskDocument::load(&tasks_file)?;
    if doc.merge_add(description) {
        doc.save(&tasks_file)?;
        println!("Added task to {}: {description}", tasks_file.display());
    } else {
        println!("Task already present in {}, nothing added.", tasks_file.display());
    }
    Ok(())
}

fn cmd_clear_done(args: &ClearDoneArgs, cfg: &Config) -> Result<()> {
    let tasks_file = config::resolve_tasks_file(args.tasks.as_deref(), cfg);
    let mut doc = TaskDocument::load(&tasks_file)?;
    doc.clear_done();
    doc.save(&tasks_file)?;
    println!("Cleared completed tasks from {}.", tasks_file.display());
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let written = init_loop(Path::new("."), &InitOptions { force })?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    println!("Edit LOOP-PROMPT.md and TASKS.md, then start with `taskloop run`.");
    Ok(())
}
