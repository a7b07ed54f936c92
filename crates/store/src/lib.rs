//! Filesystem persistence for documents and their annotation sets.
//!
//! Layout on disk:
//!
//! - `{docs_dir}/{id}.md` -- the document under review, owned by whoever
//!   generates it; this crate reads and rewrites it but keeps no
//!   authoritative in-memory copy.
//! - `{reviews_dir}/{id}.comments.json` -- the document's annotation set,
//!   a pretty-printed JSON array of annotation records.
//!
//! [`DocumentStore`] serializes every read-modify-write cycle of one
//! document (set file plus document file) behind a per-document async
//! mutex, so two concurrent requests against the same document cannot
//! lose each other's updates.

mod error;
mod store;

pub use error::StoreError;
pub use store::{Document, DocumentStore, DocumentSummary};
