use crate::flags::FeatureFlags;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A watched world, resolved to its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchListEntry {
    pub id: u32,
    pub name: String,
}

impl WatchListEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// The persisted, user-mutable configuration document.
///
/// Collections stay `None` until a command first touches them. Keys this type
/// does not know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigurationDocument {
    pub feature_flags: FeatureFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_list: Option<Vec<WatchListEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute_list: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigurationDocument {
    /// The watch list, created empty on first use.
    pub fn watch_list_mut(&mut self) -> &mut Vec<WatchListEntry> {
        self.watch_list.get_or_insert_with(Vec::new)
    }

    /// The mute list, created empty on first use.
    pub fn mute_list_mut(&mut self) -> &mut Vec<String> {
        self.mute_list.get_or_insert_with(Vec::new)
    }

    #[must_use]
    pub fn watch_list(&self) -> &[WatchListEntry] {
        self.watch_list.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn mute_list(&self) -> &[String] {
        self.mute_list.as_deref().unwrap_or_default()
    }
}
