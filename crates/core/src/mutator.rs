//! Document mutation: embedding and removing rendered annotation blocks.
//!
//! Pure text -> text transforms; the store layer owns the actual file
//! rewrites. Placement rules:
//!
//! - Selected-text anchors place the block immediately after the paragraph
//!   containing the anchor (the next blank-line boundary), so feedback
//!   lands after the prose it refers to rather than mid-sentence.
//! - Everything else (including anchors whose text has since been edited
//!   away) is appended under a dedicated review section at the bottom of
//!   the document, created on first use.

use crate::annotation::Annotation;
use crate::codec;

/// Heading of the bottom review section.
pub const REVIEW_SECTION_HEADING: &str = "## \u{1f4dd} Review Comments";

/// Insert the annotation's rendered block into the document text.
pub fn insert(document: &str, annotation: &Annotation) -> String {
    let block = codec::render(annotation);

    if !annotation.selected_text.is_empty() {
        if let Some(pos) = document.find(&annotation.selected_text) {
            let end = pos + annotation.selected_text.len();
            // Insert after the paragraph containing the match: the next
            // blank-line boundary, or end of text if there is none.
            let insert_pos = document[end..]
                .find("\n\n")
                .map(|offset| end + offset)
                .unwrap_or(document.len());

            let mut out = String::with_capacity(document.len() + block.len() + 2);
            out.push_str(&document[..insert_pos]);
            out.push_str("\n\n");
            out.push_str(&block);
            out.push_str(&document[insert_pos..]);
            return out;
        }
        // Anchor text no longer present (document was edited): fall back
        // to the bottom section rather than failing.
    }

    append_to_review_section(document, &block)
}

/// Append a rendered block under the bottom review section, creating the
/// section (with a preceding separator) the first time.
fn append_to_review_section(document: &str, block: &str) -> String {
    if document.contains(REVIEW_SECTION_HEADING) {
        format!("{document}{block}")
    } else {
        format!("{document}\n\n---\n\n{REVIEW_SECTION_HEADING}\n\n{block}")
    }
}

/// Remove exactly one occurrence of the annotation's block.
///
/// If the bottom review section is left with nothing but whitespace, the
/// section heading and its preceding separator are removed as well. An
/// annotation whose body is too large to build a pattern for leaves the
/// document unchanged.
pub fn remove(document: &str, annotation: &Annotation) -> String {
    let Some(pattern) = codec::matcher(annotation) else {
        return document.to_string();
    };
    let removed = pattern.replacen(document, 1, "\n\n").into_owned();
    cleanup_empty_review_section(&removed)
}

/// Drop the review section heading (and its `---` separator) when no
/// content follows it.
fn cleanup_empty_review_section(document: &str) -> String {
    let Some(pos) = document.find(REVIEW_SECTION_HEADING) else {
        return document.to_string();
    };

    let after = &document[pos + REVIEW_SECTION_HEADING.len()..];
    if !after.trim().is_empty() {
        return document.to_string();
    }

    let mut before = document[..pos].trim_end();
    if let Some(stripped) = before.strip_suffix("---") {
        before = stripped.trim_end();
    }
    format!("{before}\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, NewAnnotation};
    use chrono::TimeZone;
    use chrono::Utc;

    fn annotation(selected_text: &str, text: &str) -> Annotation {
        let mut a = Annotation::create(
            "test-plan",
            NewAnnotation {
                line_number: None,
                line_content: String::new(),
                section_title: String::new(),
                selected_text: selected_text.to_string(),
                text: text.to_string(),
                kind: AnnotationKind::Comment,
            },
        );
        a.created_at = Utc.with_ymd_and_hms(2026, 8, 23, 14, 5, 0).unwrap();
        a
    }

    #[test]
    fn insert_places_block_after_anchor_paragraph() {
        let doc = "# Plan\n\nDo Step 3 of the plan carefully.\nThen continue.\n\n## Next\n\nmore\n";
        let a = annotation("Step 3", "needs detail");
        let out = insert(doc, &a);

        // Block lands after the paragraph's blank-line boundary, before "## Next".
        let block_pos = out.find("### \u{1f4ac} COMMENT").unwrap();
        let next_pos = out.find("## Next").unwrap();
        assert!(block_pos < next_pos);
        assert!(out[..block_pos].contains("Then continue."));
        assert!(out.contains("> needs detail"));
    }

    #[test]
    fn insert_appends_at_end_when_no_blank_line_follows_anchor() {
        let doc = "intro\n\nfinal paragraph with Step 3 here";
        let a = annotation("Step 3", "note");
        let out = insert(doc, &a);
        assert!(out.starts_with(doc));
        assert!(out.trim_end().ends_with("_\u{2014} Reviewer, 2026/08/23 14:05_"));
    }

    #[test]
    fn insert_falls_back_to_bottom_when_anchor_missing() {
        let doc = "# Plan\n\nnothing matches here\n";
        let a = annotation("Step 3", "orphaned note");
        let out = insert(doc, &a);
        assert!(out.contains(REVIEW_SECTION_HEADING));
        assert!(out.contains("\n\n---\n\n"));
        let heading_pos = out.find(REVIEW_SECTION_HEADING).unwrap();
        let block_pos = out.find("### \u{1f4ac} COMMENT").unwrap();
        assert!(heading_pos < block_pos);
    }

    #[test]
    fn insert_without_anchor_reuses_existing_review_section() {
        let doc = "# Plan\n\nbody\n";
        let first = insert(doc, &annotation("", "first"));
        let second = insert(&first, &annotation("", "second"));

        assert_eq!(second.matches(REVIEW_SECTION_HEADING).count(), 1);
        let first_pos = second.find("> first").unwrap();
        let second_pos = second.find("> second").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn remove_deletes_exactly_one_block_leaving_others_intact() {
        let doc = "# Plan\n\npara one\n\npara two\n";
        let a = annotation("para one", "note a");
        let b = annotation("para two", "note b");
        let with_both = insert(&insert(doc, &a), &b);

        let removed = remove(&with_both, &a);
        assert!(!removed.contains("> note a"));
        assert!(removed.contains("> note b"));

        // The surviving block is byte-for-byte what its matcher expects.
        assert!(codec::matcher(&b).unwrap().is_match(&removed));
    }

    #[test]
    fn remove_cleans_up_empty_review_section() {
        let doc = "# Plan\n\nbody\n";
        let a = annotation("", "only bottom note");
        let with_block = insert(doc, &a);
        assert!(with_block.contains(REVIEW_SECTION_HEADING));

        let removed = remove(&with_block, &a);
        assert!(!removed.contains(REVIEW_SECTION_HEADING));
        assert!(!removed.contains("---"));
        assert_eq!(removed, "# Plan\n\nbody\n");
    }

    #[test]
    fn remove_keeps_review_section_while_other_notes_remain() {
        let doc = "# Plan\n\nbody\n";
        let a = annotation("", "first");
        let b = annotation("", "second");
        let with_both = insert(&insert(doc, &a), &b);

        let removed = remove(&with_both, &a);
        assert!(removed.contains(REVIEW_SECTION_HEADING));
        assert!(removed.contains("> second"));
        assert!(!removed.contains("> first"));
    }

    #[test]
    fn remove_is_noop_when_block_absent() {
        let doc = "# Plan\n\nuntouched\n";
        let a = annotation("", "never inserted");
        assert_eq!(remove(doc, &a), doc);
    }

    #[test]
    fn remove_leaves_document_alone_for_unlocatable_body() {
        let doc = "# Plan\n\nuntouched\n";
        let a = annotation("", &"x".repeat(32 * 1024 * 1024));
        assert_eq!(remove(doc, &a), doc);
    }
}
