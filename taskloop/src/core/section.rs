//! Surgical section editing for human-authored markdown documents.
//!
//! The task document is hand-edited, so mutations must be text-region
//! replacements located by heading search, never a full re-serialization.
//! Everything outside the replaced span is preserved byte-for-byte.

use std::sync::LazyLock;

use regex::Regex;

/// Byte range of a section body within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

static NEXT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s").expect("next-section pattern should be valid"));

/// Locate the body of the section introduced by the literal `heading` line.
///
/// The span starts after the heading line and the run of newlines that
/// follows it, and ends just before the next `## ` heading line or at end
/// of document. Returns `None` when the heading is absent.
pub fn find_section(doc: &str, heading: &str) -> Option<Span> {
    let pattern = format!(r"(?m)^{}[ \t]*$", regex::escape(heading));
    let heading_re = Regex::new(&pattern).expect("escaped heading pattern should be valid");
    let m = heading_re.find(doc)?;

    let mut start = m.end();
    while doc[start..].starts_with('\n') {
        start += 1;
    }

    let end = NEXT_SECTION
        .find(&doc[start..])
        .map_or(doc.len(), |next| start + next.start());

    Some(Span { start, end })
}

/// Replace a section body located by [`find_section`], leaving all other
/// bytes of the document untouched.
pub fn replace_section_body(doc: &str, span: Span, new_body: &str) -> String {
    let mut out = String::with_capacity(doc.len() - (span.end - span.start) + new_body.len());
    out.push_str(&doc[..span.start]);
    out.push_str(new_body);
    out.push_str(&doc[span.end..]);
    out
}
