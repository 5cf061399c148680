//! Append-only log of raw agent output per iteration.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

const SEPARATOR_WIDTH: usize = 60;

/// Append one iteration's output under a timestamped banner.
pub fn append_entry(path: &Path, iteration: u32, output: &str) -> Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let entry = format!("\n{separator}\nIteration {iteration} - {timestamp}\n{separator}\n{output}\n");

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("append to log file {}", path.display()))?;
    Ok(())
}
