use lumina_vfs::{FileEventKind, VirtualFileStore};
use serde::{Deserialize, Serialize};

use crate::change::{ChangeAction, ChangeBlock};
use crate::error::ApplyError;
use crate::patch::patch_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedAction {
    Created,
    Updated,
    Patched,
    Deleted,
    Error,
}

impl From<FileEventKind> for AppliedAction {
    fn from(kind: FileEventKind) -> Self {
        match kind {
            FileEventKind::Create => AppliedAction::Created,
            _ => AppliedAction::Updated,
        }
    }
}

/// Outcome of one change block. For errors `description` holds the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub file: String,
    pub action: AppliedAction,
    pub description: String,
}

/// Apply every block in order, best-effort.
///
/// Each block succeeds or fails on its own; a failure is recorded as an
/// `error` outcome and the batch moves on.
pub fn apply_changes(changes: &[ChangeBlock], store: &mut VirtualFileStore) -> Vec<AppliedChange> {
    changes
        .iter()
        .map(|change| match apply_one(change, store) {
            Ok(action) => AppliedChange {
                file: change.file.clone(),
                action,
                description: change.description.clone().unwrap_or_default(),
            },
            Err(e) => {
                log::warn!("Failed to apply {:?} to {}: {}", change.action, change.file, e);
                AppliedChange {
                    file: change.file.clone(),
                    action: AppliedAction::Error,
                    description: e.to_string(),
                }
            }
        })
        .collect()
}

fn apply_one(change: &ChangeBlock, store: &mut VirtualFileStore) -> Result<AppliedAction, ApplyError> {
    match change.action {
        ChangeAction::Create | ChangeAction::Update => {
            let content = change
                .content
                .as_ref()
                .ok_or_else(|| ApplyError::MissingContent(change.file.clone()))?;
            Ok(store.write(&change.file, content.as_str()).into())
        }
        ChangeAction::Patch => {
            patch_file(store, &change.file, &change.patches)?;
            Ok(AppliedAction::Patched)
        }
        ChangeAction::Delete => {
            if store.delete(&change.file) {
                Ok(AppliedAction::Deleted)
            } else {
                Err(ApplyError::FileNotFound(change.file.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::Patch;

    #[test]
    fn failed_patch_does_not_block_create() {
        let mut store = VirtualFileStore::new();
        let batch = vec![
            ChangeBlock::patch("missing.tsx", vec![Patch::new("a", "b")]),
            ChangeBlock::create("Button.tsx", "export default 1;"),
        ];

        let outcomes = apply_changes(&batch, &mut store);

        assert_eq!(outcomes[0].action, AppliedAction::Error);
        assert_eq!(outcomes[0].description, "File not found: missing.tsx");
        assert_eq!(outcomes[1].action, AppliedAction::Created);
        assert_eq!(store.read("Button.tsx"), Some("export default 1;"));
    }

    #[test]
    fn reports_created_updated_patched_deleted() {
        let mut store = VirtualFileStore::new();
        store.write("old.css", "x");
        let batch = vec![
            ChangeBlock::create("App.tsx", "a").with_description("root"),
            ChangeBlock::update("src/App.tsx", "count + 1"),
            ChangeBlock::patch("App.tsx", vec![Patch::new("1", "2")]),
            ChangeBlock::delete("old.css"),
        ];

        let actions: Vec<AppliedAction> = apply_changes(&batch, &mut store)
            .into_iter()
            .map(|o| o.action)
            .collect();

        assert_eq!(
            actions,
            vec![
                AppliedAction::Created,
                AppliedAction::Updated,
                AppliedAction::Patched,
                AppliedAction::Deleted
            ]
        );
        assert_eq!(store.read("App.tsx"), Some("count + 2"));
        assert!(!store.exists("old.css"));
    }

    #[test]
    fn update_of_new_file_reports_created() {
        let mut store = VirtualFileStore::new();
        let outcomes = apply_changes(&[ChangeBlock::update("a.ts", "1")], &mut store);
        assert_eq!(outcomes[0].action, AppliedAction::Created);
    }

    #[test]
    fn deleting_missing_file_is_a_block_error() {
        let mut store = VirtualFileStore::new();
        let outcomes = apply_changes(&[ChangeBlock::delete("gone.ts")], &mut store);
        assert_eq!(outcomes[0].action, AppliedAction::Error);
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let outcome = AppliedChange {
            file: "a.ts".into(),
            action: AppliedAction::Patched,
            description: String::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "patched");
    }
}
