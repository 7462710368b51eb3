use crate::registry::{CommandRegistry, Invocation};
use harbor_kernel::fault::isolate;
use harbor_kernel::output::OutputChannel;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No command matched; nothing ran and nothing was printed.
    Unknown,
    /// The line was blank.
    Empty,
    /// The handler returned an error or panicked; the user saw a generic error.
    Failed,
}

/// Routes raw input lines to registered handlers.
///
/// Dispatch runs on the caller's thread and never propagates handler failures.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    registry: Arc<CommandRegistry>,
    output: Arc<dyn OutputChannel>,
}

impl CommandRouter {
    pub fn new(registry: Arc<CommandRegistry>, output: Arc<dyn OutputChannel>) -> Self {
        Self { registry, output }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn dispatch(&self, raw: &str) -> DispatchOutcome {
        let Some((token, args)) = split_line(raw) else {
            return DispatchOutcome::Empty;
        };

        let Some(entry) = self.registry.resolve(token) else {
            debug!(command = %token, "Unknown command ignored");
            return DispatchOutcome::Unknown;
        };

        trace!(command = %entry.name, args = %args, "Dispatching command");
        let invocation = Invocation::new(entry.name.as_str(), args, Arc::clone(&self.output));

        let failure = match isolate(|| (entry.handler)(&invocation)) {
            Ok(Ok(())) => return DispatchOutcome::Handled,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("handler panicked: {panic}"),
        };

        error!(command = %entry.name, args = %args, error = %failure, "Command failed");
        self.output.print_error(&format!("Command failed: {}. Check the log for details.", entry.name));
        DispatchOutcome::Failed
    }
}

/// Splits a line into the command token and its argument text.
///
/// Line terminators are dropped; inner and trailing whitespace of the
/// arguments is kept.
fn split_line(raw: &str) -> Option<(&str, &str)> {
    let line = raw.trim_end_matches(['\r', '\n']).trim_start();
    if line.trim_end().is_empty() {
        return None;
    }

    Some(match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (line, ""),
    })
}
