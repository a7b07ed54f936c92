//! Block codec: annotation record <-> markdown block.
//!
//! Three entry points:
//!
//! - [`render`] -- deterministic annotation -> block text. Two annotations
//!   with the same kind, anchor, body, and minute-truncated timestamp
//!   render byte-identically; reconciliation relies on this for equality.
//! - [`parse`] -- discover *any* well-formed block inside arbitrary
//!   document text, tolerating light hand-editing of the whitespace
//!   between heading, body, and attribution.
//! - [`matcher`] -- a position-anchored pattern for *this* annotation's
//!   exact rendered block, with all literal content escaped. Used for
//!   surgical single-block removal and presence testing.
//!
//! `parse` and `matcher` are deliberately separate patterns so discovery
//! and exact removal can evolve independently.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::annotation::{Annotation, AnnotationKind, AnnotationStatus};

/// Selected-text excerpts longer than this are truncated in headings.
pub const EXCERPT_MAX_CHARS: usize = 80;

/// Timestamp format used in block attribution lines (minute precision).
const ATTRIBUTION_TS_FORMAT: &str = "%Y/%m/%d %H:%M";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render an annotation to its canonical markdown block.
///
/// Layout: a `###` heading encoding kind and anchor, a blank line, the
/// quote-prefixed body, a blank line, and an attribution line with the
/// creation timestamp at minute precision. Ends with a trailing blank line.
pub fn render(annotation: &Annotation) -> String {
    let mut block = heading(annotation);

    let quoted = annotation
        .text
        .split('\n')
        .collect::<Vec<_>>()
        .join("\n> ");
    block.push_str(&format!("\n\n> {quoted}\n\n"));

    block.push_str(&format!("{}\n\n", attribution(annotation)));
    block
}

/// The heading line: `### {emoji} {KIND}` plus at most one anchor clause
/// (selected-text excerpt wins over section title) and an optional line
/// clause.
fn heading(annotation: &Annotation) -> String {
    let mut heading = format!(
        "### {} {}",
        annotation.kind.emoji(),
        annotation.kind.as_str().to_uppercase()
    );
    if !annotation.selected_text.is_empty() {
        heading.push_str(&format!(" (on: \"{}\")", excerpt(&annotation.selected_text)));
    } else if !annotation.section_title.is_empty() {
        heading.push_str(&format!(" (re: \"{}\")", annotation.section_title));
    }
    if let Some(n) = annotation.line_number {
        heading.push_str(&format!(" [Line {n}]"));
    }
    heading
}

/// The attribution line, e.g. `_— Reviewer, 2026/08/23 14:05_`.
fn attribution(annotation: &Annotation) -> String {
    format!(
        "_\u{2014} Reviewer, {}_",
        annotation.created_at.format(ATTRIBUTION_TS_FORMAT)
    )
}

/// Truncate selected text to [`EXCERPT_MAX_CHARS`] characters, appending
/// an ellipsis marker when something was cut.
fn excerpt(selected_text: &str) -> String {
    let mut excerpt: String = selected_text.chars().take(EXCERPT_MAX_CHARS).collect();
    if selected_text.chars().count() > EXCERPT_MAX_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A block found in document text, not yet adopted into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub kind: AnnotationKind,
    pub selected_text: String,
    pub section_title: String,
    pub line_number: Option<u32>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ParsedBlock {
    /// Synthesize a fresh pending annotation from parsed block data.
    ///
    /// Status is always `pending` -- never inferred from the kind, even for
    /// approvals/rejections.
    pub fn into_annotation(self, document_id: impl Into<String>) -> Annotation {
        Annotation {
            id: crate::annotation::generate_id(),
            document_id: document_id.into(),
            line_number: self.line_number,
            line_content: String::new(),
            section_title: self.section_title,
            selected_text: self.selected_text,
            text: self.text,
            kind: self.kind,
            status: AnnotationStatus::Pending,
            created_at: self.created_at,
            resolved_at: None,
        }
    }
}

/// The discovery grammar for any annotation block.
///
/// Gaps between heading/body and body/attribution accept one or two
/// newlines, since documents may be hand-edited after injection.
fn block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let emoji_alt = AnnotationKind::all_emoji().join("|");
        Regex::new(&format!(
            "### ({emoji_alt}) (\\w+)\
             (?: \\(on: \"(.+?)\"\\))?\
             (?: \\(re: \"(.+?)\"\\))?\
             (?: \\[Line (\\d+)\\])?\
             \\n{{1,2}}((?:>.*\\n)+)\\n{{1,2}}\
             _\u{2014} Reviewer, (\\d{{4}}/\\d{{2}}/\\d{{2}} \\d{{2}}:\\d{{2}})_"
        ))
        .expect("block discovery grammar is a valid pattern")
    })
}

/// Scan document text for all annotation blocks, in document order.
///
/// Surrounding prose is ignored; this only ever extracts, never validates.
/// Blocks with an unparseable timestamp are skipped.
pub fn parse(document_text: &str) -> Vec<ParsedBlock> {
    let mut blocks = Vec::new();

    for caps in block_pattern().captures_iter(document_text) {
        let Some(kind) = caps.get(1).and_then(|m| AnnotationKind::from_emoji(m.as_str())) else {
            continue;
        };
        let Some(created_at) = caps.get(7).and_then(|m| parse_attribution_ts(m.as_str())) else {
            continue;
        };

        blocks.push(ParsedBlock {
            kind,
            selected_text: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
            section_title: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
            line_number: caps.get(5).and_then(|m| m.as_str().parse().ok()),
            text: unquote(caps.get(6).map(|m| m.as_str()).unwrap_or_default()),
            created_at,
        });
    }

    blocks
}

/// Strip the `> ` (or bare `>`) prefix from each quoted body line.
fn unquote(raw_quoted: &str) -> String {
    raw_quoted
        .trim_end_matches('\n')
        .split('\n')
        .map(|line| {
            line.strip_prefix("> ")
                .or_else(|| line.strip_prefix('>'))
                .unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse an attribution timestamp back to UTC (minute precision).
fn parse_attribution_ts(ts: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(ts, ATTRIBUTION_TS_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Build the exact-match pattern for one specific annotation's block.
///
/// All literal content is escaped. Whitespace slack: 0+ newlines on either
/// side, 1-2 newline gaps heading->body and body->attribution, and blank
/// quoted lines match both `>` and `> `. Trailing spaces on body lines are
/// tolerated.
///
/// Returns `None` when the body is so large that the escaped pattern
/// exceeds the regex compile-size limit; callers treat such a block as
/// unlocatable rather than panicking mid-request.
pub fn matcher(annotation: &Annotation) -> Option<Regex> {
    let header = regex::escape(&heading(annotation));

    let quoted = annotation
        .text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                "> ?".to_string()
            } else {
                format!("{} *", regex::escape(&format!("> {line}")))
            }
        })
        .collect::<Vec<_>>()
        .join("\\n");

    let ts = regex::escape(&attribution(annotation));

    // Escaped input cannot be syntactically invalid; the only compile
    // failure left is CompiledTooBig on a pathological body.
    Regex::new(&format!("\\n*{header}\\n{{1,2}}{quoted}\\n{{1,2}}{ts}\\n*")).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
