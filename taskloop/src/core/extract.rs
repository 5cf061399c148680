//! Isolates the relevant content block from raw agent output.
//!
//! Agent replies are unreliable: the requested fenced markdown block may be
//! missing, mislabeled, or replaced with loose prose. Extraction tries the
//! strictest shape first and degrades gracefully; only pure prose with no
//! structure at all is rejected.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static MARKDOWN_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)```markdown[ \t]*\r?\n(.*?)```").expect("fence pattern should be valid")
});

static ANY_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("fence pattern should be valid")
});

static STRUCTURAL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#{1,6}\s|-\s|\d+\.\s)").expect("structural pattern should be valid")
});

/// Extract the content block to hand to the task-list parser.
///
/// First match wins:
/// 1. a fenced block tagged `markdown` (case-insensitive),
/// 2. the first fenced block of any language tag,
/// 3. the suffix of the output starting at the first structural line
///    (heading, bullet, or numbered item), discarding leading prose.
///
/// Empty fenced blocks fall through to the next strategy. Nested fences are
/// not supported: the first closing fence terminates the block.
pub fn extract(raw: &str) -> Option<&str> {
    if let Some(caps) = MARKDOWN_FENCE.captures(raw) {
        let inner = caps.get(1).expect("fence capture").as_str().trim();
        if !inner.is_empty() {
            debug!(strategy = "markdown-fence", "extracted content block");
            return Some(inner);
        }
    }

    if let Some(caps) = ANY_FENCE.captures(raw) {
        let inner = caps.get(1).expect("fence capture").as_str().trim();
        if !inner.is_empty() {
            debug!(strategy = "any-fence", "extracted content block");
            return Some(inner);
        }
    }

    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        if STRUCTURAL_LINE.is_match(line) {
            debug!(strategy = "structural-line", "extracted content suffix");
            return Some(raw[offset..].trim_end());
        }
        offset += line.len();
    }

    debug!("no content block found in agent output");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_fence_is_extracted() {
        let raw = "Here you go:\n\n```markdown\n## Tasks\n\n- [ ] A\n```\n\nDone.";
        assert_eq!(extract(raw), Some("## Tasks\n\n- [ ] A"));
    }

    #[test]
    fn markdown_tag_is_case_insensitive() {
        let raw = "```Markdown\n- [ ] A\n```";
        assert_eq!(extract(raw), Some("- [ ] A"));
    }

    #[test]
    fn markdown_fence_preferred_over_earlier_fences() {
        let raw = "```text\n- [ ] Wrong\n```\n\n```markdown\n- [ ] Right\n```";
        assert_eq!(extract(raw), Some("- [ ] Right"));
    }

    #[test]
    fn any_fence_is_a_fallback() {
        let raw = "```text\n## Tasks\n\n- [ ] A\n```";
        assert_eq!(extract(raw), Some("## Tasks\n\n- [ ] A"));
    }

    #[test]
    fn untagged_fence_is_accepted() {
        let raw = "```\n- [ ] A\n```";
        assert_eq!(extract(raw), Some("- [ ] A"));
    }

    #[test]
    fn md_fence_is_accepted() {
        let raw = "```md\n- [ ] A\n```";
        assert_eq!(extract(raw), Some("- [ ] A"));
    }

    #[test]
    fn empty_fence_falls_through_to_structural_scan() {
        let raw = "```markdown\n```\n\n## Tasks\n\n- [ ] A\n";
        assert_eq!(extract(raw), Some("## Tasks\n\n- [ ] A"));
    }

    #[test]
    fn structural_scan_discards_leading_prose() {
        let raw = "I looked at the code.\nHere is what I found:\n## Tasks\n\n- [ ] A\n";
        assert_eq!(extract(raw), Some("## Tasks\n\n- [ ] A"));
    }

    #[test]
    fn bullet_line_counts_as_structural() {
        let raw = "Some prose first.\n- Task A\n- Task B\n";
        assert_eq!(extract(raw), Some("- Task A\n- Task B"));
    }

    #[test]
    fn numbered_line_counts_as_structural() {
        let raw = "Notes:\n1. First\n2. Second\n";
        assert_eq!(extract(raw), Some("1. First\n2. Second"));
    }

    #[test]
    fn pure_prose_returns_none() {
        assert_eq!(extract("I couldn't determine any tasks."), None);
    }

    #[test]
    fn empty_input_returns_none() {
        assert_eq!(extract(""), None);
    }
}
