use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lumina_protocol::detect_dependencies;
use lumina_vfs::{Snapshot, VirtualFileStore};
use serde::Serialize;

pub const DEFAULT_PROJECT_ID: &str = "default";

/// What a preview pulls: the full file map and the revision it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSnapshot {
    pub revision: u64,
    pub files: Snapshot,
}

/// One project's file store plus a revision counter bumped on every store
/// notification.
#[derive(Debug)]
pub struct ProjectSession {
    id: String,
    store: VirtualFileStore,
    revision: Arc<AtomicU64>,
}

impl ProjectSession {
    /// New session seeded with the starter project.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let revision = Arc::new(AtomicU64::new(0));
        let mut store = VirtualFileStore::new();

        let counter = revision.clone();
        let project = id.clone();
        store.watch(move |event| {
            let revision = counter.fetch_add(1, Ordering::SeqCst) + 1;
            log::debug!("[{}] r{} {:?} {}", project, revision, event.kind, event.path.as_deref().unwrap_or("*"));
            Ok(())
        });
        store.seed_defaults();

        Self { id, store, revision }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &VirtualFileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VirtualFileStore {
        &mut self.store
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            revision: self.revision(),
            files: self.store.export(),
        }
    }

    pub fn import(&mut self, files: Snapshot) -> ProjectSnapshot {
        self.store.import_all(files);
        self.snapshot()
    }

    /// External packages imported anywhere in the project, first-seen order
    /// over files sorted by path.
    pub fn dependencies(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for (_, content) in self.store.export() {
            for dep in detect_dependencies(&content) {
                if !all.contains(&dep) {
                    all.push(dep);
                }
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_seeded_with_one_load() {
        let session = ProjectSession::new("p1");
        assert_eq!(session.id(), "p1");
        assert_eq!(session.revision(), 1);
        assert!(session.store().exists("App.tsx"));
    }

    #[test]
    fn every_store_mutation_bumps_revision() {
        let mut session = ProjectSession::new("p1");
        session.store_mut().write("a.ts", "1");
        session.store_mut().delete("a.ts");
        session.store_mut().delete("a.ts");
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn import_replaces_files() {
        let mut session = ProjectSession::new("p1");
        let files = Snapshot::from([("src/Main.tsx".to_string(), "x".to_string())]);
        let snapshot = session.import(files);
        assert_eq!(snapshot.files.keys().collect::<Vec<_>>(), vec!["Main.tsx"]);
        assert_eq!(snapshot.revision, 2);
    }

    #[test]
    fn dependencies_cover_all_files() {
        let mut session = ProjectSession::new("p1");
        session.import(Snapshot::from([
            ("App.tsx".to_string(), "import React from 'react';\nimport { motion } from 'framer-motion';".to_string()),
            ("b.tsx".to_string(), "import { create } from 'zustand';\nimport React from 'react';".to_string()),
        ]));
        assert_eq!(session.dependencies(), vec!["react", "framer-motion", "zustand"]);
    }
}
