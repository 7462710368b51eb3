//! Kernel seams shared by the Harbor feature crates.
//! Keep this crate lightweight: it holds the traits the host and its extensions
//! meet at, plus the layered settings loader.
//!
//! ## Settings loading
//! ```rust,ignore
//! use harbor_kernel::config::load_config;
//! use harbor_kernel::domain::HostSettings;
//!
//! let settings: HostSettings = load_config(Some("harbor.toml")).unwrap();
//! ```
//!
//! ## Output
//! ```rust
//! # use harbor_kernel::output::{CapturedOutput, OutputChannel};
//! let out = CapturedOutput::default();
//! out.print("\"ugly word\"");
//! assert_eq!(out.messages(), ["\"ugly word\""]);
//! ```
pub mod config;
pub mod fault;
pub mod lookup;
pub mod output;

pub use harbor_domain as domain;
