use lumina_vfs::VirtualFileStore;

use crate::change::Patch;
use crate::error::ApplyError;

/// Result of running a patch list over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub content: String,
    pub applied: usize,
    /// Indexes of patches whose find text was not present.
    pub skipped: Vec<usize>,
}

/// Apply `patches` in order, each to the output of the previous one.
///
/// Only the first occurrence of a find text is replaced. Patches whose find
/// text is empty or absent are skipped with a warning.
pub fn apply_patches(content: &str, patches: &[Patch]) -> PatchOutcome {
    let mut current = content.to_string();
    let mut applied = 0;
    let mut skipped = Vec::new();

    for (index, patch) in patches.iter().enumerate() {
        if patch.find.is_empty() {
            log::warn!("Patch {} has empty find text, skipping", index);
            skipped.push(index);
            continue;
        }
        if !current.contains(&patch.find) {
            log::warn!("Patch {} find text not found, skipping", index);
            skipped.push(index);
            continue;
        }
        current = current.replacen(&patch.find, &patch.replace, 1);
        applied += 1;
    }

    PatchOutcome {
        content: current,
        applied,
        skipped,
    }
}

/// Patch a file in the store and write the result back.
pub fn patch_file(
    store: &mut VirtualFileStore,
    path: &str,
    patches: &[Patch],
) -> Result<PatchOutcome, ApplyError> {
    let current = store
        .read(path)
        .ok_or_else(|| ApplyError::FileNotFound(path.to_string()))?;
    let outcome = apply_patches(current, patches);
    store.write(path, outcome.content.clone());
    log::debug!(
        "Patched {}: {} applied, {} skipped",
        path,
        outcome.applied,
        outcome.skipped.len()
    );
    Ok(outcome)
}
