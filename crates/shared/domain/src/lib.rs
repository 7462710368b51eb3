//! # Domain Models
//!
//! Pure data types shared by every Harbor crate, with minimal dependencies
//! (`serde`, `bitflags`, `typed-builder`). No I/O, no locking, no logging:
//! just data and simple helpers.

pub mod config;
pub mod constants;
pub mod document;
pub mod flags;
pub mod launch;

pub use config::HostSettings;
pub use document::{ConfigurationDocument, WatchListEntry};
pub use flags::FeatureFlags;
pub use launch::LaunchConfig;
