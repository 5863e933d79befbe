use std::path::PathBuf;

/// Data directory for the builder (~/.lumina), overridable with `LUMINA_DATA_DIR`.
pub fn lumina_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("LUMINA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".lumina")
}

pub fn settings_json_path() -> PathBuf {
    lumina_dir().join("settings.json")
}

pub fn ensure_lumina_dir() -> std::io::Result<PathBuf> {
    let dir = lumina_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
