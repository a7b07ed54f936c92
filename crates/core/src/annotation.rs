//! Annotation records, kinds, and lifecycle.
//!
//! An [`Annotation`] is one reviewer comment attached to a document. It is
//! persisted as JSON by `redline-store` and rendered into the document
//! itself as a markdown block by [`crate::codec`]. The body is immutable
//! after creation; the only state change is the one-way
//! `pending -> resolved` transition.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnnotationKind
// ---------------------------------------------------------------------------

/// The category of a reviewer annotation.
///
/// Each kind has a fixed emoji used in the rendered block heading; the
/// emoji (not the keyword) is what identifies the kind when parsing blocks
/// back out of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Comment,
    Suggestion,
    Question,
    Approve,
    Reject,
}

impl AnnotationKind {
    /// Return the kind as its lowercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Suggestion => "suggestion",
            Self::Question => "question",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// The emoji used in rendered block headings for this kind.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Comment => "\u{1f4ac}",    // 💬
            Self::Suggestion => "\u{1f4a1}", // 💡
            Self::Question => "\u{2753}",    // ❓
            Self::Approve => "\u{2705}",     // ✅
            Self::Reject => "\u{274c}",      // ❌
        }
    }

    /// Reverse lookup from a block heading emoji.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji {
            "\u{1f4ac}" => Some(Self::Comment),
            "\u{1f4a1}" => Some(Self::Suggestion),
            "\u{2753}" => Some(Self::Question),
            "\u{2705}" => Some(Self::Approve),
            "\u{274c}" => Some(Self::Reject),
            _ => None,
        }
    }

    /// All heading emoji, in kind declaration order.
    pub fn all_emoji() -> [&'static str; 5] {
        [
            Self::Comment.emoji(),
            Self::Suggestion.emoji(),
            Self::Question.emoji(),
            Self::Approve.emoji(),
            Self::Reject.emoji(),
        ]
    }
}

impl Default for AnnotationKind {
    fn default() -> Self {
        Self::Comment
    }
}

// ---------------------------------------------------------------------------
// AnnotationStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an annotation. The transition is one-way:
/// `Pending -> Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStatus {
    Pending,
    Resolved,
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// One reviewer comment attached to a document.
///
/// The anchor fields are checked in priority order: `selected_text` wins
/// over `section_title`, which wins over `line_number`. All three may be
/// empty/unset, in which case the rendered block has a bare heading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique within a document's annotation set; time-ordered with a
    /// random suffix so concurrent creation never collides.
    pub id: String,
    /// Owning document id (filename stem).
    pub document_id: String,
    pub line_number: Option<u32>,
    #[serde(default)]
    pub line_content: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub selected_text: String,
    /// Free-text body. Immutable after creation.
    pub text: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub status: AnnotationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Annotation {
    /// Build a new pending annotation for `document_id` from client input.
    pub fn create(document_id: impl Into<String>, input: NewAnnotation) -> Self {
        Self {
            id: generate_id(),
            document_id: document_id.into(),
            line_number: input.line_number,
            line_content: input.line_content,
            section_title: input.section_title,
            selected_text: input.selected_text,
            text: input.text,
            kind: input.kind,
            status: AnnotationStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Mark the annotation resolved, recording the resolution time.
    pub fn resolve(&mut self) {
        self.status = AnnotationStatus::Resolved;
        self.resolved_at = Some(Utc::now());
    }
}

/// Client payload for creating an annotation.
///
/// `text` is required; everything else is optional. A missing `type`
/// defaults to `comment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    pub line_number: Option<u32>,
    #[serde(default)]
    pub line_content: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub selected_text: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: AnnotationKind,
}

// ---------------------------------------------------------------------------
// Id generation
// ---------------------------------------------------------------------------

const ID_SUFFIX_LEN: usize = 6;
const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh annotation id: `comment-{unix_millis}-{random suffix}`.
///
/// The millisecond prefix keeps ids time-ordered; the random suffix keeps
/// ids created in the same millisecond distinct.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect();
    format!("comment-{millis}-{suffix}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_emoji() {
        for kind in [
            AnnotationKind::Comment,
            AnnotationKind::Suggestion,
            AnnotationKind::Question,
            AnnotationKind::Approve,
            AnnotationKind::Reject,
        ] {
            assert_eq!(AnnotationKind::from_emoji(kind.emoji()), Some(kind));
        }
    }

    #[test]
    fn unknown_emoji_is_rejected() {
        assert_eq!(AnnotationKind::from_emoji("\u{1f600}"), None);
        assert_eq!(AnnotationKind::from_emoji(""), None);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.starts_with("comment-"));
    }

    #[test]
    fn create_starts_pending_without_resolution_time() {
        let input = NewAnnotation {
            line_number: Some(3),
            line_content: String::new(),
            section_title: String::new(),
            selected_text: "Step 3".to_string(),
            text: "needs detail".to_string(),
            kind: AnnotationKind::Question,
        };
        let annotation = Annotation::create("my-plan", input);
        assert_eq!(annotation.document_id, "my-plan");
        assert_eq!(annotation.status, AnnotationStatus::Pending);
        assert!(annotation.resolved_at.is_none());
    }

    #[test]
    fn resolve_is_recorded() {
        let input = NewAnnotation {
            line_number: None,
            line_content: String::new(),
            section_title: String::new(),
            selected_text: String::new(),
            text: "looks good".to_string(),
            kind: AnnotationKind::Approve,
        };
        let mut annotation = Annotation::create("my-plan", input);
        annotation.resolve();
        assert_eq!(annotation.status, AnnotationStatus::Resolved);
        assert!(annotation.resolved_at.is_some());
    }

    #[test]
    fn wire_format_uses_camel_case_and_type_key() {
        let input = NewAnnotation {
            line_number: None,
            line_content: String::new(),
            section_title: "Rollout".to_string(),
            selected_text: String::new(),
            text: "why two phases?".to_string(),
            kind: AnnotationKind::Question,
        };
        let annotation = Annotation::create("my-plan", input);
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["documentId"], "my-plan");
        assert_eq!(json["type"], "question");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["sectionTitle"], "Rollout");
        assert!(json.get("resolvedAt").is_none());
    }

    #[test]
    fn new_annotation_defaults_kind_to_comment() {
        let input: NewAnnotation = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(input.kind, AnnotationKind::Comment);
        assert!(input.selected_text.is_empty());
        assert!(input.line_number.is_none());
    }
}
