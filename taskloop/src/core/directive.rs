//! Turns an extracted content block into a task/constraint directive.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Recognized planning constraints suggested by the agent.
///
/// Unrecognized keys are ignored during parsing; a missing Constraints
/// section yields the default (all `None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Security posture, e.g. `conservative`, `path_restricted`, `yolo`.
    pub security_mode: Option<String>,
    /// Verbatim comma-separated path list.
    pub allow_paths: Option<String>,
    pub internet_access: Option<bool>,
}

/// Parsed agent directive: an ordered task list plus constraints.
///
/// Consumed once by the caller; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    pub tasks: Vec<String>,
    pub constraints: Constraints,
}

static TASKS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]*Tasks[ \t]*$").expect("heading pattern should be valid")
});

static CONSTRAINTS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]*Constraints[ \t]*$").expect("heading pattern should be valid")
});

static ANY_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s").expect("heading pattern should be valid"));

static CHECKBOX_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-\s*\[(?:\s*|[xX])\]").expect("item pattern should be valid")
});

static UNCHECKED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*\[\s*\]\s*(.+)$").expect("item pattern should be valid"));

static PLAIN_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+(.+)$").expect("item pattern should be valid"));

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.+)$").expect("item pattern should be valid"));

/// Parse a content block into a [`Directive`].
///
/// Task extraction is scoped to a `Tasks` heading (levels 1-6) when one is
/// present, otherwise applied to the whole content. Parsing succeeds when a
/// Tasks heading was located (an explicit empty list is valid and means
/// "nothing to add") or when at least one task came out of the whole-content
/// fallback. Returns `None` otherwise, signaling the caller to retry.
pub fn parse(content: &str) -> Option<Directive> {
    let constraints = parse_constraints(content);

    if let Some(scope) = heading_scope(content, &TASKS_HEADING) {
        let tasks = extract_tasks(scope);
        debug!(count = tasks.len(), "parsed tasks under Tasks heading");
        return Some(Directive { tasks, constraints });
    }

    let tasks = extract_tasks(content);
    if tasks.is_empty() {
        debug!("no Tasks heading and nothing extractable");
        return None;
    }
    debug!(count = tasks.len(), "parsed tasks from whole content");
    Some(Directive { tasks, constraints })
}

/// Body of the first section matching `heading_re`, ending at the next
/// heading of any level or end of content.
fn heading_scope<'a>(content: &'a str, heading_re: &Regex) -> Option<&'a str> {
    let m = heading_re.find(content)?;
    let rest = &content[m.end()..];
    let end = ANY_HEADING.find(rest).map_or(rest.len(), |next| next.start());
    Some(&rest[..end])
}

/// Extract task texts from a scope with checkbox > plain > numbered priority.
///
/// Any checkbox line (checked or not) activates checkbox mode: checked items
/// are excluded from the result, but their presence suppresses the plain and
/// numbered fallbacks even when zero unchecked items remain.
fn extract_tasks(scope: &str) -> Vec<String> {
    let mut checkbox_mode = false;
    let mut tasks = Vec::new();
    for line in scope.lines() {
        let line = line.trim();
        if !CHECKBOX_ITEM.is_match(line) {
            continue;
        }
        checkbox_mode = true;
        if let Some(caps) = UNCHECKED_ITEM.captures(line) {
            let text = caps.get(1).expect("item capture").as_str().trim();
            if !text.is_empty() {
                tasks.push(text.to_string());
            }
        }
    }
    if checkbox_mode {
        return tasks;
    }

    let plain = collect_items(scope, &PLAIN_ITEM);
    if !plain.is_empty() {
        return plain;
    }
    collect_items(scope, &NUMBERED_ITEM)
}

fn collect_items(scope: &str, item_re: &Regex) -> Vec<String> {
    scope
        .lines()
        .filter_map(|line| item_re.captures(line.trim()))
        .map(|caps| caps.get(1).expect("item capture").as_str().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Parse the Constraints section, if any.
///
/// Each `key: value` line is handled independently; malformed lines are
/// skipped without failing the overall parse.
fn parse_constraints(content: &str) -> Constraints {
    let mut constraints = Constraints::default();
    let Some(scope) = heading_scope(content, &CONSTRAINTS_HEADING) else {
        return constraints;
    };
    for line in scope.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        match key.as_str() {
            "security_mode" => constraints.security_mode = Some(value.to_string()),
            "allow_paths" => constraints.allow_paths = Some(value.to_string()),
            "internet_access" => constraints.internet_access = Some(parse_bool(value)),
            _ => {}
        }
    }
    constraints
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1")
}
