//! # Extensions
//!
//! Extension modules are compiled into the host and declared by manifest
//! files. The host registers a factory per entry point; the
//! [`LifecycleManager`] discovers manifests in a primary and an optional
//! fallback directory, builds the matching modules and drives their
//! `initialize`/`dispose` calls behind fault boundaries.

pub mod discovery;
mod error;
pub mod lifecycle;
pub mod manifest;
pub mod module;

pub use crate::error::{ExtensionError, ExtensionErrorExt};
pub use crate::lifecycle::{
    ExtensionFailure, FailureStage, LifecycleManager, LifecycleState, LoadReport, LoadedExtension,
    SkipReason,
};
pub use crate::manifest::ExtensionManifest;
pub use crate::module::{ExtensionFactory, ExtensionHost, ExtensionModule, ModuleResult};
