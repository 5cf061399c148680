//! Agent loop driver over a markdown task document.
//!
//! This crate drives an external generative coding agent (claude, codex or
//! gemini) in a loop, tracking work in a persistent, human-editable
//! `TASKS.md`. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (output extraction, task-list
//!   parsing, surgical section editing). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (task document, config, process
//!   execution, git, run log, templates). Isolated to enable faking in tests.
//!
//! Orchestration modules ([`looping`], [`plan`], [`retry`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod plan;
pub mod retry;
#[cfg(test)]
pub mod test_support;
