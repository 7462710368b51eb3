//! # Settings
//!
//! The persisted [`ConfigurationStore`] and the command family that edits it:
//!
//! * `/xlmute`, `/xlunmute`, `/xlmutelist`: the mute list;
//! * `/xlwatch`: the world watch list, resolved through a [`NameResolver`];
//! * `/xlflags`: the [`FeatureFlags`] bitmask.
//!
//! Every mutation is saved synchronously before the command confirms it.
//!
//! [`NameResolver`]: harbor_kernel::lookup::NameResolver
//! [`FeatureFlags`]: harbor_domain::FeatureFlags

pub mod commands;
mod error;
pub mod store;

pub use crate::commands::{SettingsContext, register_commands};
pub use crate::error::{SettingsError, SettingsErrorExt};
pub use crate::store::ConfigurationStore;
