use crate::error::{ExtensionError, ExtensionErrorExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Declaration of one extension, read from its manifest file.
///
/// `entry` names the compiled-in factory that builds the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub entry: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub version: Option<String>,
    /// Where the manifest was read from; empty for embedded manifests.
    #[serde(skip)]
    pub path: PathBuf,
}

const fn enabled_by_default() -> bool {
    true
}

impl ExtensionManifest {
    pub fn new(id: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            entry: entry.into(),
            enabled: true,
            version: None,
            path: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Reads and validates a manifest file.
    ///
    /// # Errors
    /// [`ExtensionError::Io`], [`ExtensionError::Json`] or
    /// [`ExtensionError::InvalidManifest`].
    pub fn load(path: &Path) -> Result<Self, ExtensionError> {
        let raw = std::fs::read_to_string(path).context(path.display().to_string())?;
        let mut manifest: Self =
            serde_json::from_str(&raw).context(path.display().to_string())?;
        manifest.path = path.to_path_buf();
        manifest.validate().context(path.display().to_string())?;
        Ok(manifest)
    }

    /// Ids are non-empty and limited to ASCII alphanumerics, `.`, `-` and `_`.
    ///
    /// # Errors
    /// [`ExtensionError::InvalidManifest`] describing the first violation.
    pub fn validate(&self) -> Result<(), ExtensionError> {
        let invalid = |message: String| ExtensionError::InvalidManifest {
            message: message.into(),
            context: None,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_owned()));
        }
        if !self.id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')) {
            return Err(invalid(format!("id '{}' contains unsupported characters", self.id)));
        }
        if self.entry.trim().is_empty() {
            return Err(invalid(format!("extension '{}' has an empty entry", self.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extension.json");
        fs::write(&path, r#"{"id":"sample","entry":"builtin.sample"}"#).unwrap();

        let manifest = ExtensionManifest::load(&path).unwrap();
        assert!(manifest.enabled);
        assert_eq!(manifest.display_name(), "sample");
        assert_eq!(manifest.path, path);
    }

    #[test]
    fn test_load_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");

        assert!(matches!(ExtensionManifest::load(&path), Err(ExtensionError::Io { .. })));

        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(ExtensionManifest::load(&path), Err(ExtensionError::Json { .. })));

        fs::write(&path, r#"{"id":"bad id","entry":"x"}"#).unwrap();
        let err = ExtensionManifest::load(&path).unwrap_err();
        assert!(matches!(err, ExtensionError::InvalidManifest { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_validate_rejects_empty_entry() {
        let manifest = ExtensionManifest::new("sample", " ");
        assert!(manifest.validate().is_err());
        assert!(ExtensionManifest::new("a.b-c_d", "x").validate().is_ok());
    }
}
