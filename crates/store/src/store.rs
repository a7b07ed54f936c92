use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use redline_core::reconcile::reconcile;
use redline_core::{mutator, Annotation, NewAnnotation};

use crate::StoreError;

/// Documents are markdown files; everything else in the directory is ignored.
const DOC_EXTENSION: &str = "md";

/// Annotation set filename suffix, keyed by document stem.
const SET_FILE_SUFFIX: &str = ".comments.json";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Listing entry for one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    pub modified: DateTime<Utc>,
    pub size: u64,
    pub comment_count: usize,
}

/// A single document with its reconciled annotation list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    pub modified: DateTime<Utc>,
    pub comments: Vec<Annotation>,
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Filesystem-backed store for documents and annotation sets.
///
/// Cheap to share via `Arc`. All mutation of one document's files goes
/// through [`DocumentStore::doc_lock`], the per-document critical section
/// that prevents concurrent requests from interleaving their
/// read-modify-write cycles.
pub struct DocumentStore {
    docs_dir: PathBuf,
    reviews_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    pub fn new(docs_dir: impl Into<PathBuf>, reviews_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            reviews_dir: reviews_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directories watched for out-of-band changes.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        vec![self.docs_dir.clone(), self.reviews_dir.clone()]
    }

    /// Create the document and review directories if they do not exist.
    ///
    /// Failure here is startup-fatal for the server; everything after
    /// startup treats filesystem trouble as transient.
    pub async fn ensure_dirs(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.docs_dir).await?;
        tokio::fs::create_dir_all(&self.reviews_dir).await?;
        Ok(())
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.docs_dir.join(format!("{id}.{DOC_EXTENSION}"))
    }

    fn set_path(&self, id: &str) -> PathBuf {
        self.reviews_dir.join(format!("{id}{SET_FILE_SUFFIX}"))
    }

    /// Get (creating on first use) the critical-section mutex for one document.
    async fn doc_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    // -- Annotation sets ----------------------------------------------------

    /// Load a document's annotation set.
    ///
    /// A missing or unparseable set file is an empty set, not an error;
    /// the next save rewrites it wholesale.
    pub async fn load_annotations(&self, id: &str) -> Vec<Annotation> {
        let path = self.set_path(id);
        let Ok(raw) = tokio::fs::read_to_string(&path).await else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(document_id = %id, error = %e, "Unparseable annotation set, treating as empty");
                Vec::new()
            }
        }
    }

    async fn save_annotations(&self, id: &str, set: &[Annotation]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(set)?;
        tokio::fs::write(self.set_path(id), json).await?;
        Ok(())
    }

    // -- Documents ------------------------------------------------------------

    /// List all documents, newest first.
    ///
    /// A missing docs directory yields an empty list; per-file stat or
    /// read failures skip that file (it may have been deleted mid-scan).
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        let Ok(mut entries) = tokio::fs::read_dir(&self.docs_dir).await else {
            return Ok(Vec::new());
        };

        let mut summaries = Vec::new();
        // An error mid-scan ends the listing with what was gathered so far;
        // a transient failure here must not take down the endpoint.
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOC_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let Some(content) = read_text(&path).await else {
                continue;
            };
            let comment_count = self.load_annotations(id).await.len();

            summaries.push(DocumentSummary {
                id: id.to_string(),
                name: format!("{id}.{DOC_EXTENSION}"),
                path: path.display().to_string(),
                content,
                modified: modified_time(&meta),
                size: meta.len(),
                comment_count,
            });
        }

        summaries.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(summaries)
    }

    /// Fetch one document, reconciling its annotation set against the
    /// blocks currently present in the text.
    ///
    /// Returns `None` when the document file does not exist. The set file
    /// is rewritten only if reconciliation changed it.
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let path = self.document_path(id);

        let lock = self.doc_lock(id).await;
        let _guard = lock.lock().await;

        let Ok(meta) = tokio::fs::metadata(&path).await else {
            return Ok(None);
        };
        let Some(content) = read_text(&path).await else {
            return Ok(None);
        };

        let stored = self.load_annotations(id).await;
        let (comments, changed) = reconcile(id, &content, stored);
        if changed {
            tracing::debug!(document_id = %id, count = comments.len(), "Annotation set reconciled");
            self.save_annotations(id, &comments).await?;
        }

        Ok(Some(Document {
            id: id.to_string(),
            name: format!("{id}.{DOC_EXTENSION}"),
            path: path.display().to_string(),
            content,
            modified: modified_time(&meta),
            comments,
        }))
    }

    // -- Mutations ------------------------------------------------------------

    /// Create an annotation: append to the set file, then embed the
    /// rendered block into the document text.
    ///
    /// Returns `None` when the document does not exist.
    pub async fn add_annotation(
        &self,
        id: &str,
        input: NewAnnotation,
    ) -> Result<Option<Annotation>, StoreError> {
        let path = self.document_path(id);

        let lock = self.doc_lock(id).await;
        let _guard = lock.lock().await;

        let Some(content) = read_text(&path).await else {
            return Ok(None);
        };

        let annotation = Annotation::create(id, input);

        let mut set = self.load_annotations(id).await;
        set.push(annotation.clone());
        self.save_annotations(id, &set).await?;

        let updated = mutator::insert(&content, &annotation);
        tokio::fs::write(&path, updated).await?;

        Ok(Some(annotation))
    }

    /// Mark an annotation resolved. Does not touch the document file; the
    /// rendered block stays in place.
    pub async fn resolve_annotation(
        &self,
        document_id: &str,
        annotation_id: &str,
    ) -> Result<Option<Annotation>, StoreError> {
        let lock = self.doc_lock(document_id).await;
        let _guard = lock.lock().await;

        let mut set = self.load_annotations(document_id).await;
        let Some(annotation) = set.iter_mut().find(|a| a.id == annotation_id) else {
            return Ok(None);
        };
        annotation.resolve();
        let resolved = annotation.clone();
        self.save_annotations(document_id, &set).await?;
        Ok(Some(resolved))
    }

    /// Delete an annotation from the set and strip its block from the
    /// document text.
    ///
    /// Returns the removed annotation, or `None` when the id was not in
    /// the set (the document file is left untouched in that case).
    pub async fn delete_annotation(
        &self,
        document_id: &str,
        annotation_id: &str,
    ) -> Result<Option<Annotation>, StoreError> {
        let lock = self.doc_lock(document_id).await;
        let _guard = lock.lock().await;

        let mut set = self.load_annotations(document_id).await;
        let Some(index) = set.iter().position(|a| a.id == annotation_id) else {
            return Ok(None);
        };
        let target = set.remove(index);
        self.save_annotations(document_id, &set).await?;

        let path = self.document_path(document_id);
        if let Some(content) = read_text(&path).await {
            let updated = mutator::remove(&content, &target);
            if updated != content {
                tokio::fs::write(&path, updated).await?;
            }
        }

        Ok(Some(target))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a file as text, replacing invalid UTF-8. `None` when unreadable.
async fn read_text(path: &Path) -> Option<String> {
    let bytes = tokio::fs::read(path).await.ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Modification time as UTC, falling back to now when the platform
/// cannot report it.
fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
