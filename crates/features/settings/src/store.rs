//! The persisted configuration document.
//!
//! Mutations hold the store's lock across the change and the following save,
//! so concurrent handlers never lose each other's updates. Saves replace the
//! whole file through a temporary file and a rename.

use crate::error::{SettingsError, SettingsErrorExt};
use harbor_domain::ConfigurationDocument;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

#[derive(Debug)]
pub struct ConfigurationStore {
    path: PathBuf,
    document: Mutex<ConfigurationDocument>,
    tmp_counter: AtomicU64,
}

impl ConfigurationStore {
    /// Loads the document at `path`. A missing or empty file yields the default document.
    ///
    /// # Errors
    /// [`SettingsError::Load`] when the file cannot be read,
    /// [`SettingsError::Malformed`] when it is not a valid document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => ConfigurationDocument::default(),
            Ok(raw) => serde_json::from_str(&raw).context(path.display().to_string())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No configuration document yet, starting from defaults");
                ConfigurationDocument::default()
            },
            Err(e) => {
                return Err(SettingsError::Load {
                    message: e.to_string().into(),
                    context: Some(path.display().to_string().into()),
                });
            },
        };

        debug!(path = %path.display(), flags = document.feature_flags.bits(), "Configuration document loaded");
        Ok(Self { path, document: Mutex::new(document), tmp_counter: AtomicU64::new(0) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn snapshot(&self) -> ConfigurationDocument {
        self.document.lock().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&ConfigurationDocument) -> R) -> R {
        f(&self.document.lock())
    }

    /// Applies `f` and saves the whole document.
    ///
    /// # Errors
    /// [`SettingsError::Persist`] when the save fails.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut ConfigurationDocument) -> R) -> Result<R, SettingsError> {
        let mut document = self.document.lock();
        let result = f(&mut document);
        self.persist(&document)?;
        Ok(result)
    }

    /// Applies `f` and saves only when it reports a change by returning `Some`.
    ///
    /// # Errors
    /// [`SettingsError::Persist`] when the save fails.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut ConfigurationDocument) -> Option<R>,
    ) -> Result<Option<R>, SettingsError> {
        let mut document = self.document.lock();
        let result = f(&mut document);
        if result.is_some() {
            self.persist(&document)?;
        }
        Ok(result)
    }

    /// Saves the current document.
    ///
    /// # Errors
    /// [`SettingsError::Persist`] when the save fails.
    pub fn save(&self) -> Result<(), SettingsError> {
        let document = self.document.lock();
        self.persist(&document)
    }

    fn persist(&self, document: &ConfigurationDocument) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(std::io::Error::other)
            .context("Serializing configuration document")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
        }

        let temp = self.unique_tmp_path();
        {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&bytes).context("Write failed")?;
            file.sync_all().context("Sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &self.path) {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&self.path)
                    .context(format!("Failed to replace {}", self.path.display()))?;
                fs::rename(&temp, &self.path).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    self.path.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(SettingsError::Persist {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), self.path.display())
                            .into(),
                    ),
                });
            }
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "Configuration document saved");
        Ok(())
    }

    fn unique_tmp_path(&self) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = self.path.file_name().and_then(|s| s.to_str()).unwrap_or("harbor");
        self.path.with_file_name(format!("{file_name}.harbortmp.{}.{counter}", std::process::id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_domain::{FeatureFlags, WatchListEntry};

    #[test]
    fn test_missing_and_empty_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ConfigurationStore::open(dir.path().join("none.json")).unwrap();
        assert_eq!(missing.snapshot(), ConfigurationDocument::default());

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "  \n").unwrap();
        assert_eq!(ConfigurationStore::open(&empty).unwrap().snapshot(), ConfigurationDocument::default());
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{ \"featureFlags\": \"many\" }").unwrap();
        assert!(matches!(ConfigurationStore::open(&path), Err(SettingsError::Malformed { .. })));
    }

    #[test]
    fn test_mutate_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");
        let store = ConfigurationStore::open(&path).unwrap();

        store
            .mutate(|doc| {
                doc.feature_flags.insert(FeatureFlags::RICH_PRESENCE);
                doc.watch_list_mut().push(WatchListEntry::new(73, "Ifrit"));
            })
            .unwrap();

        let reopened = ConfigurationStore::open(&path).unwrap();
        assert_eq!(reopened.snapshot(), store.snapshot());
        assert_eq!(reopened.read(|doc| doc.watch_list().len()), 1);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().contains("harbortmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_update_skips_save_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let store = ConfigurationStore::open(&path).unwrap();

        assert_eq!(store.update(|_| None::<()>).unwrap(), None);
        assert!(!path.exists());

        assert_eq!(store.update(|doc| Some(doc.mute_list_mut().push("x".into()))).unwrap(), Some(()));
        assert!(path.exists());
    }

    #[test]
    fn test_save_failure_is_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("later");
        let store = ConfigurationStore::open(parent.join("doc.json")).unwrap();

        // A regular file where the parent directory should be created.
        fs::write(&parent, "").unwrap();
        let err = store.mutate(|doc| doc.mute_list_mut().push("x".into())).unwrap_err();
        assert!(matches!(err, SettingsError::Persist { .. }));
        assert_eq!(store.read(|doc| doc.mute_list().len()), 1);
    }

    #[test]
    fn test_unknown_keys_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"{"featureFlags":0,"windowOpacity":0.5}"#).unwrap();

        let store = ConfigurationStore::open(&path).unwrap();
        store.save().unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["windowOpacity"], 0.5);
    }
}
