use crate::error::{ExtensionError, ExtensionErrorExt};
use harbor_domain::constants::MANIFEST_FILE;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Finds manifest files under `root`, sorted by path.
///
/// Accepts `*.json` files directly in `root` and `extension.json` one level
/// down. A missing root yields nothing.
///
/// # Errors
/// [`ExtensionError::Discovery`] when `root` exists but cannot be walked.
pub fn discover_manifests(root: &Path) -> Result<Vec<PathBuf>, ExtensionError> {
    if !root.exists() {
        debug!(root = %root.display(), "Extension directory does not exist");
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(2).sort_by_file_name() {
        let entry = entry.context(root.display().to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let wanted = match entry.depth() {
            1 => path.extension().and_then(|ext| ext.to_str()) == Some("json"),
            _ => path.file_name().and_then(|name| name.to_str()) == Some(MANIFEST_FILE),
        };
        if wanted {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort();
    debug!(root = %root.display(), found = paths.len(), "Extension manifests discovered");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_manifests(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_finds_flat_and_nested_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("beta")).unwrap();
        fs::create_dir_all(root.join("gamma/deeper")).unwrap();
        fs::write(root.join("alpha.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join("beta").join(MANIFEST_FILE), "{}").unwrap();
        fs::write(root.join("beta/other.json"), "{}").unwrap();
        fs::write(root.join("gamma/deeper").join(MANIFEST_FILE), "{}").unwrap();

        let found = discover_manifests(root).unwrap();
        assert_eq!(found, [root.join("alpha.json"), root.join("beta").join(MANIFEST_FILE)]);
    }
}
