use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::path::normalize_path;

/// Flat mapping of normalized path to content.
pub type Snapshot = BTreeMap<String, String>;

type Observer = Box<dyn Fn(&FileEvent) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEventKind {
    Create,
    Update,
    Delete,
    /// Whole-store replacement; carries no path.
    Load,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    #[serde(rename = "type")]
    pub kind: FileEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileEvent {
    fn for_path(kind: FileEventKind, path: &str) -> Self {
        Self {
            kind,
            path: Some(path.to_string()),
        }
    }

    fn load() -> Self {
        Self {
            kind: FileEventKind::Load,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

/// In-memory path -> content map for one project.
///
/// Not internally synchronized: a session owns its store and serializes
/// access (the server wraps it in a mutex per project).
#[derive(Default)]
pub struct VirtualFileStore {
    files: Snapshot,
    observers: Vec<(WatchId, Observer)>,
    next_watch_id: u64,
}

impl std::fmt::Debug for VirtualFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualFileStore")
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl VirtualFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the starter project.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.seed_defaults();
        store
    }

    /// Replace all files with the starter project; one `load` notification.
    pub fn seed_defaults(&mut self) {
        self.import_all(defaults::starter_files());
    }

    /// Upsert. Returns the kind of change that was reported.
    pub fn write(&mut self, path: &str, content: impl Into<String>) -> FileEventKind {
        let normalized = normalize_path(path);
        let kind = if self.files.contains_key(&normalized) {
            FileEventKind::Update
        } else {
            FileEventKind::Create
        };
        self.files.insert(normalized.clone(), content.into());
        self.notify(&FileEvent::for_path(kind, &normalized));
        kind
    }

    pub fn read(&self, path: &str) -> Option<&str> {
        self.files.get(&normalize_path(path)).map(String::as_str)
    }

    /// Removes the file if present. Absent paths are a silent no-op.
    pub fn delete(&mut self, path: &str) -> bool {
        let normalized = normalize_path(path);
        if self.files.remove(&normalized).is_none() {
            return false;
        }
        self.notify(&FileEvent::for_path(FileEventKind::Delete, &normalized));
        true
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    pub fn list(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn export(&self) -> Snapshot {
        self.files.clone()
    }

    /// Atomically replace every file. Incoming paths are normalized; when two
    /// incoming paths normalize to the same key the later one (in snapshot
    /// order) wins.
    pub fn import_all<I, K, V>(&mut self, snapshot: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let files = snapshot
            .into_iter()
            .map(|(path, content)| (normalize_path(path.as_ref()), content.into()))
            .collect();
        self.files = files;
        self.notify(&FileEvent::load());
    }

    pub fn watch<F>(&mut self, observer: F) -> WatchId
    where
        F: Fn(&FileEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = WatchId(self.next_watch_id);
        self.next_watch_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(watch_id, _)| *watch_id != id);
        self.observers.len() != before
    }

    // Observer errors and panics are contained here.
    fn notify(&self, event: &FileEvent) {
        for (id, observer) in &self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::warn!("File store observer {:?} failed on {:?}: {}", id, event, e);
                }
                Err(_) => {
                    log::warn!("File store observer {:?} panicked on {:?}", id, event);
                }
            }
        }
    }
}
