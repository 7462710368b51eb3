//! # Commands
//!
//! The text-command surface of the host.
//!
//! * [`registry`]: named entries with help text, visibility and an owner.
//! * [`router`]: splits a raw input line, resolves the command and runs its
//!   handler inside a fault boundary.
//! * [`help`]: renders the help listing.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use harbor_commands::{CommandRegistry, CommandRouter, DispatchOutcome, Invocation};
//! use harbor_kernel::output::CapturedOutput;
//!
//! let registry = Arc::new(CommandRegistry::new());
//! registry
//!     .register("/echo", |inv: &Invocation| { inv.print(&inv.args); Ok(()) }, "Echoes its arguments.", true)
//!     .unwrap();
//!
//! let output = Arc::new(CapturedOutput::default());
//! let router = CommandRouter::new(registry, output.clone());
//! assert_eq!(router.dispatch("/echo  hello world"), DispatchOutcome::Handled);
//! assert_eq!(output.messages(), ["hello world"]);
//! ```

mod error;
pub mod help;
pub mod registry;
pub mod router;

pub use crate::error::{CommandError, CommandErrorExt};
pub use crate::registry::{CommandEntry, CommandHandler, CommandOwner, CommandRegistry, Invocation};
pub use crate::router::{CommandRouter, DispatchOutcome};
