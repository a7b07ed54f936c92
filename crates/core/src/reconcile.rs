//! Two-way reconciliation between a stored annotation set and the blocks
//! actually present in a document.
//!
//! The document file is the source of truth for *presence* (a reviewer or
//! an external process may strip or append blocks at any time); the store
//! is the source of truth for *identity and status*. Reconciliation runs
//! on every single-document fetch, in two ordered passes:
//!
//! 1. Prune -- stored annotations whose rendered block no longer matches
//!    the document are dropped (a stripped block is an implicit withdrawal).
//! 2. Adopt -- blocks found in the document that no surviving annotation
//!    renders to are synthesized into new pending annotations.

use std::collections::HashSet;

use crate::annotation::Annotation;
use crate::codec;

/// Reconcile `stored` against `document_text`.
///
/// Returns the reconciled set and whether it differs from the input; the
/// caller persists only on change. Running this twice over unchanged
/// inputs reports no change the second time.
pub fn reconcile(
    document_id: &str,
    document_text: &str,
    stored: Vec<Annotation>,
) -> (Vec<Annotation>, bool) {
    let before = stored.len();

    // Pass 1: prune annotations whose block was edited out of the document.
    // An annotation whose body is too large to build a pattern for cannot
    // be verified either way and is kept, never pruned.
    let mut reconciled: Vec<Annotation> = stored
        .into_iter()
        .filter(|a| match codec::matcher(a) {
            Some(pattern) => pattern.is_match(document_text),
            None => true,
        })
        .collect();
    let mut changed = reconciled.len() != before;

    // Pass 2: adopt document blocks that no surviving annotation produces.
    // Canonical rendered text is the equality basis, so annotations that
    // differ only below minute granularity compare equal here.
    let mut known_blocks: HashSet<String> = reconciled.iter().map(codec::render).collect();

    for parsed in codec::parse(document_text) {
        let candidate = parsed.into_annotation(document_id);
        let rendered = codec::render(&candidate);
        if !known_blocks.contains(&rendered) {
            known_blocks.insert(rendered);
            reconciled.push(candidate);
            changed = true;
        }
    }

    (reconciled, changed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationKind, AnnotationStatus, NewAnnotation};
    use crate::mutator;
    use chrono::{TimeZone, Utc};

    fn annotation(text: &str, kind: AnnotationKind) -> Annotation {
        let mut a = Annotation::create(
            "test-plan",
            NewAnnotation {
                line_number: None,
                line_content: String::new(),
                section_title: String::new(),
                selected_text: String::new(),
                text: text.to_string(),
                kind,
            },
        );
        a.created_at = Utc.with_ymd_and_hms(2026, 8, 23, 14, 5, 0).unwrap();
        a
    }

    #[test]
    fn stored_annotation_with_block_present_survives_unchanged() {
        let a = annotation("keep me", AnnotationKind::Comment);
        let doc = mutator::insert("# Plan\n\nbody\n", &a);

        let (reconciled, changed) = reconcile("test-plan", &doc, vec![a.clone()]);
        assert!(!changed);
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].id, a.id);
    }

    #[test]
    fn prunes_annotation_whose_block_was_stripped() {
        let a = annotation("remove me", AnnotationKind::Comment);
        // Document never contained (or no longer contains) the block.
        let doc = "# Plan\n\nbody\n";

        let (reconciled, changed) = reconcile("test-plan", doc, vec![a]);
        assert!(changed);
        assert!(reconciled.is_empty());
    }

    #[test]
    fn adopts_unmatched_document_block_as_pending() {
        let external = annotation("added out of band", AnnotationKind::Approve);
        let doc = mutator::insert("# Plan\n\nbody\n", &external);

        // Store knows nothing about it.
        let (reconciled, changed) = reconcile("test-plan", &doc, vec![]);
        assert!(changed);
        assert_eq!(reconciled.len(), 1);
        let adopted = &reconciled[0];
        assert_eq!(adopted.text, "added out of band");
        assert_eq!(adopted.kind, AnnotationKind::Approve);
        // Status is never inferred from kind, even for approvals.
        assert_eq!(adopted.status, AnnotationStatus::Pending);
        assert_eq!(adopted.document_id, "test-plan");
        assert_ne!(adopted.id, external.id);
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let known = annotation("already stored", AnnotationKind::Comment);
        let external = annotation("from the document", AnnotationKind::Question);
        let doc = mutator::insert(&mutator::insert("# Plan\n\nbody\n", &known), &external);

        let (first, changed_first) = reconcile("test-plan", &doc, vec![known]);
        assert!(changed_first);
        assert_eq!(first.len(), 2);

        let (second, changed_second) = reconcile("test-plan", &doc, first.clone());
        assert!(!changed_second);
        assert_eq!(second.len(), 2);
        assert_eq!(
            first.iter().map(|a| a.id.clone()).collect::<Vec<_>>(),
            second.iter().map(|a| a.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unlocatable_body_is_kept_not_pruned() {
        // Body too large to build an exact-match pattern for: presence in
        // the document cannot be verified, so the record must survive.
        let a = annotation(&"x".repeat(32 * 1024 * 1024), AnnotationKind::Comment);
        let (reconciled, changed) = reconcile("test-plan", "# Plan\n\nbody\n", vec![a.clone()]);
        assert!(!changed);
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].id, a.id);
    }

    #[test]
    fn resolved_status_survives_reconciliation() {
        let mut a = annotation("resolved note", AnnotationKind::Comment);
        a.resolve();
        let doc = mutator::insert("# Plan\n\nbody\n", &a);

        let (reconciled, changed) = reconcile("test-plan", &doc, vec![a]);
        assert!(!changed);
        assert_eq!(reconciled[0].status, AnnotationStatus::Resolved);
    }
}
