use crate::launch::LaunchConfig;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime settings of the host process, loaded once at startup.
///
/// Distinct from the mutable [`ConfigurationDocument`](crate::ConfigurationDocument):
/// nothing here changes while the host runs.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostSettingsInner {
    pub document: DocumentSettings,
    pub extensions: ExtensionSettings,
    pub logging: LoggingSettings,
    pub lookup: LookupSettings,
    /// Registers hidden debug commands and lists them in help.
    pub debug_commands: bool,
    pub launch: Option<LaunchConfig>,
}

/// Thin Arc-wrapped settings for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct HostSettings {
    #[serde(flatten, default)]
    inner: Arc<HostSettingsInner>,
}

impl Deref for HostSettings {
    type Target = HostSettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for HostSettings {
    fn deref_mut(&mut self) -> &mut HostSettingsInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Where the configuration document lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub path: PathBuf,
}

/// Extension search directories. The primary directory wins on id clashes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    pub primary_dir: PathBuf,
    pub fallback_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Extra filter directives, e.g. `harbor_extensions=trace`.
    pub filter: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
}

/// Offline name catalog used by the shell's resolver.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    pub catalog: Option<PathBuf>,
}

// --- Default ---

impl Default for DocumentSettings {
    fn default() -> Self {
        Self { path: PathBuf::from("harbor.json") }
    }
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self { primary_dir: PathBuf::from("extensions"), fallback_dir: None }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            json: false,
            max_files: 7,
        }
    }
}
