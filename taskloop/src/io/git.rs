//! Git adapter for verbose progress reporting.
//!
//! The loop never commits; git is only consulted to show the operator what
//! files changed during an iteration, so we keep a small, explicit wrapper
//! around `git` subprocess calls.

use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.run_capture(&["status", "--porcelain=v1", "-uall"])?;
        let mut entries = Vec::new();
        for line in out.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_status_line(line)?);
        }
        Ok(entries)
    }

    /// One-line-per-category summary of worktree changes for progress
    /// display. Failures (no git, not a repository) degrade to a message
    /// rather than an error since this is informational only.
    pub fn change_summary(&self) -> String {
        match self.status_porcelain() {
            Ok(entries) => summarize_changes(&entries),
            Err(err) => {
                debug!(error = %err, "git status unavailable");
                "Progress tracking unavailable (is this a git repository?)".to_string()
            }
        }
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

/// Group status entries into Modified/New/Deleted/Other lines.
pub fn summarize_changes(entries: &[StatusEntry]) -> String {
    let mut modified = Vec::new();
    let mut new_files = Vec::new();
    let mut deleted = Vec::new();
    let mut other = Vec::new();

    for entry in entries {
        let path = entry.path.as_str();
        if entry.code.contains('M') {
            modified.push(path);
        } else if entry.code == "??" || entry.code.contains('A') {
            new_files.push(path);
        } else if entry.code.contains('D') {
            deleted.push(path);
        } else {
            other.push(path);
        }
    }

    let mut parts = Vec::new();
    if !modified.is_empty() {
        parts.push(format!("Modified: {}", modified.join(", ")));
    }
    if !new_files.is_empty() {
        parts.push(format!("New: {}", new_files.join(", ")));
    }
    if !deleted.is_empty() {
        parts.push(format!("Deleted: {}", deleted.join(", ")));
    }
    if !other.is_empty() {
        parts.push(format!("Other: {}", other.join(", ")));
    }

    if parts.is_empty() {
        "No file changes".to_string()
    } else {
        parts.join("\n")
    }
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(anyhow!("unexpected porcelain line: '{line}'"));
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, path: &str) -> StatusEntry {
        StatusEntry {
            code: code.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn parse_untracked_line() {
        let parsed = parse_status_line("?? notes.txt").expect("parse");
        assert_eq!(parsed, entry("??", "notes.txt"));
    }

    #[test]
    fn parse_modified_line() {
        let parsed = parse_status_line(" M src/lib.rs").expect("parse");
        assert_eq!(parsed, entry(" M", "src/lib.rs"));
    }

    #[test]
    fn parse_rename_keeps_new_path() {
        let parsed = parse_status_line("R  old.rs -> new.rs").expect("parse");
        assert_eq!(parsed.path, "new.rs");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_status_line("x").is_err());
    }

    #[test]
    fn summary_groups_by_category() {
        let summary = summarize_changes(&[
            entry(" M", "a.rs"),
            entry("??", "b.rs"),
            entry("A ", "c.rs"),
            entry(" D", "d.rs"),
            entry("R ", "e.rs"),
        ]);
        assert_eq!(
            summary,
            "Modified: a.rs\nNew: b.rs, c.rs\nDeleted: d.rs\nOther: e.rs"
        );
    }

    #[test]
    fn summary_of_clean_tree() {
        assert_eq!(summarize_changes(&[]), "No file changes");
    }
}
