//! Facade crate for the Harbor host.
//! Re-exports the shared and feature crates and composes them into an
//! [`Orchestrator`]. Keep this crate thin: it wires components together; the
//! behaviour lives in the feature crates.
//!
//! ## Usage
//! ```rust,ignore
//! let host = harbor::Orchestrator::builder(settings, output)
//!     .subsystem(SubsystemStage::Hooks, my_hook)
//!     .extension("builtin.greeter", |_| Box::new(Greeter::default()))
//!     .build()?;
//! host.start()?;
//! host.wait_for_unload();
//! host.dispose();
//! ```

mod builtins;
mod error;
pub mod host;
pub mod orchestrator;
pub mod subsystem;

pub use harbor_commands as commands;
pub use harbor_domain as domain;
pub use harbor_extensions as extensions;
pub use harbor_kernel as kernel;
pub use harbor_runtime as runtime;
pub use harbor_settings as settings;

pub use crate::error::{HarborError, HarborErrorExt};
pub use crate::host::{HostContext, HostHandle};
pub use crate::orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorState};
pub use crate::subsystem::{Subsystem, SubsystemResult, SubsystemStage};
