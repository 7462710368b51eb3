//! Help listing shown by the host's help command.

use crate::registry::{CommandEntry, CommandRegistry};

/// One line per command, in registration order.
#[must_use]
pub fn listing(registry: &CommandRegistry, include_hidden: bool) -> Vec<String> {
    registry.list_visible(include_hidden).iter().map(describe).collect()
}

/// `"/name: help"`, with a marker for hidden commands.
#[must_use]
pub fn describe(entry: &CommandEntry) -> String {
    let help = if entry.help.is_empty() { "No help available." } else { entry.help.as_str() };
    if entry.visible {
        format!("{}: {help}", entry.name)
    } else {
        format!("{}: {help} (hidden)", entry.name)
    }
}

/// Help for a single command, resolved the way the router resolves it.
#[must_use]
pub fn describe_command(registry: &CommandRegistry, token: &str) -> Option<String> {
    registry.resolve(token).as_ref().map(describe)
}
