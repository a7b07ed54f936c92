//! Polling directory watcher.
//!
//! Keeps a filename -> mtime snapshot per watched directory and, on every
//! tick, publishes one `file-change` event per added/modified file and one
//! per deleted file. The snapshot is replaced unconditionally each tick,
//! so a transient stat failure merely excludes the file from the new
//! snapshot instead of wedging the loop.
//!
//! Polling is the reference semantics here; the watched directories are
//! small and local, so a one-second scan is cheap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use crate::bus::{EventBus, ReviewEvent};

/// Files with any other extension are ignored.
const TRACKED_EXTENSION: &str = "md";

/// Default interval between polling ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// What happened to a watched file between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileEventKind {
    Change,
    Delete,
}

impl FileEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Delete => "delete",
        }
    }
}

/// Watches a set of directories for markdown file changes.
pub struct DirWatcher {
    dirs: Vec<PathBuf>,
    interval: Duration,
    snapshots: HashMap<PathBuf, HashMap<String, SystemTime>>,
}

impl DirWatcher {
    pub fn new(dirs: Vec<PathBuf>, interval: Duration) -> Self {
        Self {
            dirs,
            interval,
            snapshots: HashMap::new(),
        }
    }

    /// Run the polling loop until `cancel` fires.
    ///
    /// The initial snapshot is taken before the first tick, so files that
    /// existed at startup do not produce spurious change events.
    pub async fn run(mut self, bus: std::sync::Arc<EventBus>, cancel: CancellationToken) {
        self.prime();
        tracing::info!(
            dirs = self.dirs.len(),
            interval_secs = self.interval.as_secs(),
            "File watcher started"
        );

        let mut interval = tokio::time::interval(self.interval);
        // The first tick of a tokio interval fires immediately; consume it
        // so the loop waits a full period after priming.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("File watcher stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.tick(&bus);
                }
            }
        }
    }

    /// Take the initial snapshot of every watched directory.
    fn prime(&mut self) {
        for dir in &self.dirs {
            self.snapshots.insert(dir.clone(), scan(dir));
        }
    }

    /// One polling pass: rescan, publish diffs, replace snapshots.
    fn tick(&mut self, bus: &EventBus) {
        for dir in self.dirs.clone() {
            let current = scan(&dir);
            let prev = self.snapshots.get(&dir).cloned().unwrap_or_default();

            let dir_name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for (file, kind) in diff(&prev, &current) {
                tracing::debug!(dir = %dir_name, file = %file, event = kind.as_str(), "File event");
                bus.publish(ReviewEvent::new("file-change").with_payload(serde_json::json!({
                    "dir": dir_name,
                    "file": file,
                    "event": kind.as_str(),
                })));
            }

            self.snapshots.insert(dir, current);
        }
    }
}

/// Snapshot a directory: filename -> mtime for all tracked files.
///
/// A missing directory or a per-file stat failure yields an absent entry,
/// never an error.
fn scan(dir: &Path) -> HashMap<String, SystemTime> {
    let mut snapshot = HashMap::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return snapshot;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TRACKED_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Ok(mtime) = entry.metadata().and_then(|m| m.modified()) {
            snapshot.insert(name.to_string(), mtime);
        }
    }
    snapshot
}

/// Compare two snapshots: new or modified files are changes, files present
/// before but absent now are deletes. Exactly one event per file.
fn diff(
    prev: &HashMap<String, SystemTime>,
    current: &HashMap<String, SystemTime>,
) -> Vec<(String, FileEventKind)> {
    let mut events = Vec::new();
    for (name, mtime) in current {
        if prev.get(name) != Some(mtime) {
            events.push((name.clone(), FileEventKind::Change));
        }
    }
    for name in prev.keys() {
        if !current.contains_key(name) {
            events.push((name.clone(), FileEventKind::Delete));
        }
    }
    events
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
