//! Loop configuration stored in `.taskloop.toml`.
//!
//! Every field is optional in the file; resolution is `CLI flag > file >
//! default`, one pure function per field so precedence stays testable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = ".taskloop.toml";

pub const DEFAULT_TASKS_FILE: &str = "TASKS.md";
pub const DEFAULT_PROMPT_FILE: &str = "LOOP-PROMPT.md";
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Loop configuration (TOML).
///
/// This file is intended to be edited by humans; missing sections and fields
/// fall back to defaults at resolution time.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub security: SecuritySection,
    #[serde(rename = "loop")]
    pub run: RunSection,
    pub output: OutputSection,
    pub session: SessionSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecuritySection {
    /// Skip all agent permission prompts.
    pub yolo: Option<bool>,
    /// Comma-separated paths the agent may write to.
    pub allow_paths: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunSection {
    pub max_iterations: Option<u32>,
    pub tasks_file: Option<PathBuf>,
    pub prompt_file: Option<PathBuf>,
    pub agent: Option<String>,
    /// Keep iterating even when no unchecked tasks remain.
    pub keep_running: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSection {
    pub log_file: Option<PathBuf>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSection {
    /// Reuse the agent conversation across iterations.
    pub continue_session: Option<bool>,
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `Config::default()`.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

pub fn resolve_yolo(flag: Option<bool>, cfg: &Config) -> bool {
    flag.or(cfg.security.yolo).unwrap_or(true)
}

/// Empty or whitespace-only paths resolve to none.
pub fn resolve_allow_paths(flag: Option<&str>, cfg: &Config) -> Option<String> {
    flag.map(ToString::to_string)
        .or_else(|| cfg.security.allow_paths.clone())
        .filter(|paths| !paths.trim().is_empty())
}

pub fn resolve_max_iterations(flag: Option<u32>, cfg: &Config) -> u32 {
    flag.or(cfg.run.max_iterations)
        .unwrap_or(DEFAULT_MAX_ITERATIONS)
}

pub fn resolve_tasks_file(flag: Option<&Path>, cfg: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| cfg.run.tasks_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TASKS_FILE))
}

pub fn resolve_prompt_file(flag: Option<&Path>, cfg: &Config) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| cfg.run.prompt_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_FILE))
}

pub fn resolve_agent(flag: Option<&str>, cfg: &Config) -> Option<String> {
    flag.map(ToString::to_string).or_else(|| cfg.run.agent.clone())
}

pub fn resolve_keep_running(flag: Option<bool>, cfg: &Config) -> bool {
    flag.or(cfg.run.keep_running).unwrap_or(false)
}

pub fn resolve_continue_session(flag: Option<bool>, cfg: &Config) -> bool {
    flag.or(cfg.session.continue_session).unwrap_or(false)
}

pub fn resolve_verbose(flag: bool, cfg: &Config) -> bool {
    flag || cfg.output.verbose.unwrap_or(false)
}

pub fn resolve_log_file(flag: Option<&Path>, cfg: &Config) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| cfg.output.log_file.clone())
}
