//! Redline domain core.
//!
//! Pure types and algorithms for the review annotation system:
//!
//! - [`annotation`] -- the annotation record, its kinds and lifecycle.
//! - [`codec`] -- rendering annotations into markdown blocks, parsing
//!   blocks back out of document text, and building exact-match patterns
//!   for single-block removal.
//! - [`mutator`] -- inserting/removing rendered blocks in document text.
//! - [`reconcile`] -- the two-way sync between a stored annotation set and
//!   the blocks actually present in a document.
//!
//! Everything here is side-effect free; file I/O lives in `redline-store`.

pub mod annotation;
pub mod codec;
pub mod error;
pub mod mutator;
pub mod reconcile;

pub use annotation::{Annotation, AnnotationKind, AnnotationStatus, NewAnnotation};
pub use error::CoreError;
