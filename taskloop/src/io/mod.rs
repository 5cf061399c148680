//! I/O helpers for taskloop commands.

pub mod config;
pub mod git;
pub mod init;
pub mod process;
pub mod prompt;
pub mod run_log;
pub mod task_store;
