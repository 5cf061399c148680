//! The persistent, human-editable task document (`TASKS.md`).
//!
//! The document is the single source of truth and may be hand-edited between
//! runs, so it is loaded fresh from disk for every operation, mutated by
//! surgical section edits, and written back whole. Sections may contain
//! arbitrary prose next to list items; bytes outside the edited region are
//! never touched.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::core::section::{find_section, replace_section_body};

pub const DONE_HEADING: &str = "## Done";
pub const TODO_HEADING: &str = "## Todo";

/// Default document skeleton used when the file does not exist yet.
pub const SKELETON: &str = "# Tasks\n\n## Done\n\n## In Progress\n\n## Todo\n";

static TASK_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^- \[([xX ])\] (.+)$").expect("task item pattern should be valid")
});

static UNCHECKED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- \[ \] (.+)$").expect("task item pattern should be valid"));

/// A single checkbox line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    /// Item text without the checkbox prefix. Never contains a newline.
    pub text: String,
    pub checked: bool,
}

/// In-memory copy of the task document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDocument {
    content: String,
}

impl TaskDocument {
    /// Read the document from disk, synthesizing the default skeleton when
    /// the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "tasks file missing, using skeleton");
            return Ok(Self {
                content: SKELETON.to_string(),
            });
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self { content })
    }

    /// Persist by full-file rewrite.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.content).with_context(|| format!("write {}", path.display()))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// All checkbox items in document order.
    pub fn items(&self) -> Vec<TaskLine> {
        TASK_ITEM
            .captures_iter(&self.content)
            .map(|caps| TaskLine {
                text: caps.get(2).expect("item capture").as_str().trim().to_string(),
                checked: caps.get(1).expect("state capture").as_str() != " ",
            })
            .collect()
    }

    /// Case-insensitive exact-text membership test across all sections,
    /// checked and unchecked alike.
    pub fn contains(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        self.items()
            .iter()
            .any(|item| item.text.to_lowercase() == needle)
    }

    /// Append a new unchecked item at the end of the Todo section, creating
    /// the section if missing. Duplicate suppression is centralized here:
    /// returns `false` without modification when the text is already present
    /// anywhere in the document.
    pub fn merge_add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.contains(text) {
            debug!(task = text, "skipping duplicate or empty task");
            return false;
        }
        let task_line = format!("- [ ] {text}\n");

        let Some(span) = find_section(&self.content, TODO_HEADING) else {
            // No Todo heading anywhere: append a new section at end-of-file.
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push_str("\n## Todo\n\n");
            self.content.push_str(&task_line);
            return true;
        };

        let body = &self.content[span.start..span.end];
        let new_body = if body.trim().is_empty() {
            // Empty section: the task line goes right where the body starts,
            // without introducing a leading blank line. Keep a blank line
            // between the new item and any following section.
            if span.end < self.content.len() {
                format!("{task_line}\n")
            } else {
                task_line
            }
        } else {
            // Insert directly after the last existing line, preserving any
            // trailing blank run before the next section.
            let content_end = body.trim_end_matches('\n').len();
            let (head, tail) = body.split_at(content_end);
            let rest = tail.strip_prefix('\n').unwrap_or(tail);
            format!("{head}\n{task_line}{rest}")
        };
        self.content = replace_section_body(&self.content, span, &new_body);
        true
    }

    /// Empty the Done section's checkbox items while retaining its header.
    /// Prose inside the section and all other sections are untouched.
    pub fn clear_done(&mut self) {
        let Some(span) = find_section(&self.content, DONE_HEADING) else {
            return;
        };
        let body = &self.content[span.start..span.end];
        let new_body: String = body
            .split_inclusive('\n')
            .filter(|line| !TASK_ITEM.is_match(line.trim_end()))
            .collect();
        self.content = replace_section_body(&self.content, span, &new_body);
    }

    /// True when any unchecked item exists anywhere in the document.
    pub fn remaining(&self) -> bool {
        UNCHECKED_ITEM.is_match(&self.content)
    }

    /// First unchecked item text, for loop progress display.
    pub fn current_task(&self) -> Option<String> {
        UNCHECKED_ITEM
            .captures(&self.content)
            .map(|caps| caps.get(1).expect("item capture").as_str().trim().to_string())
    }

    /// Formatted context block describing existing tasks, for the planning
    /// meta-prompt. `None` when the document holds no checkbox items.
    pub fn existing_tasks_summary(&self) -> Option<String> {
        let items = self.items();
        if items.is_empty() {
            return None;
        }
        let mut out = String::from(
            "## Existing Tasks\n\nThere is already a tasks file with the following tasks:\n",
        );
        let done: Vec<&TaskLine> = items.iter().filter(|item| item.checked).collect();
        let pending: Vec<&TaskLine> = items.iter().filter(|item| !item.checked).collect();
        if !done.is_empty() {
            out.push_str("\n### Completed\n");
            for item in done {
                out.push_str(&format!("- [x] {}\n", item.text));
            }
        }
        if !pending.is_empty() {
            out.push_str("\n### Pending\n");
            for item in pending {
                out.push_str(&format!("- [ ] {}\n", item.text));
            }
        }
        out.push_str(
            "\n**Important**: Do NOT suggest tasks that duplicate the above. \
             Focus on NEW tasks that build on or complement the existing work.\n",
        );
        Some(out)
    }
}

/// Loop-level completion check. A missing file means the state is unknown,
/// so the loop keeps running.
pub fn tasks_remaining(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(TaskDocument::load(path)?.remaining())
}
