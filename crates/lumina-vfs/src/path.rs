/// Normalize a project path for the flat-root preview target.
///
/// Strips one leading `./` or `/`, then one leading `src/` segment. Nothing
/// else is touched: `a/../b` stays as written, and `src/App.tsx` and
/// `App.tsx` collide on purpose.
pub fn normalize_path(path: &str) -> String {
    let stripped = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path);
    stripped.strip_prefix("src/").unwrap_or(stripped).to_string()
}
