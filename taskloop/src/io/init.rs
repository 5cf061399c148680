//! Scaffolding for `taskloop init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{CONFIG_FILE, DEFAULT_PROMPT_FILE, DEFAULT_TASKS_FILE};
use super::task_store::SKELETON;

const LOOP_PROMPT_TEMPLATE: &str = include_str!("templates/LOOP-PROMPT.md");
const CONFIG_TEMPLATE: &str = include_str!("templates/taskloop.toml");

/// Options for `init_loop`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing loop-owned files.
    pub force: bool,
}

/// Create the loop's working files in `root`: the prompt file, the task
/// document skeleton and a commented-out config file.
///
/// Fails if any of them already exists unless `options.force` is set.
pub fn init_loop(root: &Path, options: &InitOptions) -> Result<Vec<PathBuf>> {
    let targets = [
        (root.join(DEFAULT_PROMPT_FILE), LOOP_PROMPT_TEMPLATE),
        (root.join(DEFAULT_TASKS_FILE), SKELETON),
        (root.join(CONFIG_FILE), CONFIG_TEMPLATE),
    ];

    if !options.force {
        for (path, _) in &targets {
            if path.exists() {
                return Err(anyhow!(
                    "taskloop init: {} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
        }
    }

    let mut written = Vec::new();
    for (path, contents) in targets {
        fs::write(&path, contents).with_context(|| format!("write file {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
