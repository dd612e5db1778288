//! On-disk workspace state checks.
use crate::error::{ProvisionError, ProvisionResult};
use crate::workspace::paths::is_schema_file;
use std::fs;
use std::path::{Path, PathBuf};

/// Remove the tool cache directory if present.
///
/// Returns `true` when a directory was removed; an absent cache is a no-op.
pub fn clean_cache(cache_dir: &Path) -> ProvisionResult<bool> {
    if !cache_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(cache_dir)
        .map_err(|err| ProvisionError::fs(format!("remove {}", cache_dir.display()), err))?;
    tracing::info!(path = %cache_dir.display(), "cleared tool cache");
    Ok(true)
}

/// True when the workspace marker directory exists.
pub fn is_initialized(marker_dir: &Path) -> bool {
    marker_dir.is_dir()
}

/// Collect schema files under `root`, skipping hidden directories.
pub fn collect_schema_files(root: &Path) -> ProvisionResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.is_dir() {
        return Ok(files);
    }
    let entries =
        fs::read_dir(root).map_err(|err| ProvisionError::fs(format!("read {}", root.display()), err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ProvisionError::fs(format!("read {}", root.display()), err))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_dir() {
            if !hidden {
                files.extend(collect_schema_files(&path)?);
            }
        } else if path.is_file() && is_schema_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
