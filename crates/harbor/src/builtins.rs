//! Commands the host registers for itself.

use crate::host::{HostContext, HostHandle, WeakHostContext};
use harbor_commands::{CommandError, CommandRegistry, Invocation, help};
use harbor_domain::constants::{HELP, PLUGINS, RELOAD, UNLOAD};
use harbor_extensions::{ExtensionError, LifecycleManager};
use std::sync::Weak;
use tracing::info;

const STATUS: &str = "/xlstatus";

type Lifecycle = Weak<LifecycleManager<HostHandle>>;

/// Registers the help, extension and lifecycle commands.
///
/// Handlers hold weak references, so the registry never keeps the host alive.
pub(crate) fn register(
    registry: &CommandRegistry,
    host: &HostContext,
    lifecycle: &Lifecycle,
) -> Result<(), CommandError> {
    let weak = host.downgrade();
    let show_hidden = host.settings.debug_commands;
    registry.register(
        HELP,
        move |inv| help_command(&weak, show_hidden, inv),
        "Lists commands: /xlhelp [all | <command>]",
        true,
    )?;

    let manager = lifecycle.clone();
    registry.register(PLUGINS, move |inv| plugins(&manager, inv), "Lists loaded extensions.", true)?;

    let (weak, manager) = (host.downgrade(), lifecycle.clone());
    registry.register(
        RELOAD,
        move |inv| reload(&weak, &manager, inv),
        "Unloads and reloads every extension.",
        true,
    )?;

    let weak = host.downgrade();
    registry.register(UNLOAD, move |inv| unload(&weak, inv), "Unloads the host.", true)?;

    let (weak, manager) = (host.downgrade(), lifecycle.clone());
    registry.register(STATUS, move |inv| status(&weak, &manager, inv), "Shows host internals.", false)?;

    Ok(())
}

fn upgrade(host: &WeakHostContext) -> Result<HostContext, CommandError> {
    host.upgrade().ok_or_else(|| CommandError::from("host is shutting down"))
}

fn help_command(host: &WeakHostContext, show_hidden: bool, inv: &Invocation) -> Result<(), CommandError> {
    let host = upgrade(host)?;
    let topic = inv.args.trim();

    if !topic.is_empty() && !topic.eq_ignore_ascii_case("all") {
        match help::describe_command(&host.registry, topic) {
            Some(line) => inv.print(&line),
            None => inv.print(&format!("No such command: {topic}")),
        }
        return Ok(());
    }

    let include_hidden = show_hidden || topic.eq_ignore_ascii_case("all");
    for line in help::listing(&host.registry, include_hidden) {
        inv.print(&line);
    }
    Ok(())
}

fn plugins(lifecycle: &Lifecycle, inv: &Invocation) -> Result<(), CommandError> {
    let manager = lifecycle.upgrade().ok_or_else(|| CommandError::from("extensions are gone"))?;
    let loaded = manager.loaded();
    if loaded.is_empty() {
        inv.print("No extensions loaded.");
    }
    for extension in loaded {
        match extension.version {
            Some(version) => inv.print(&format!("{} v{version} ({})", extension.name, extension.id)),
            None => inv.print(&format!("{} ({})", extension.name, extension.id)),
        }
    }
    Ok(())
}

fn reload(host: &WeakHostContext, lifecycle: &Lifecycle, inv: &Invocation) -> Result<(), CommandError> {
    let host = upgrade(host)?;
    let manager = lifecycle.upgrade().ok_or_else(|| CommandError::from("extensions are gone"))?;

    match manager.reload(&host) {
        Ok(report) => {
            let failed = report.failures.len();
            info!(loaded = report.loaded.len(), failed, "Extensions reloaded on request");
            if failed == 0 {
                inv.print(&format!("Reloaded {} extension(s).", report.loaded.len()));
            } else {
                inv.print(&format!("Reloaded {} extension(s), {failed} failure(s).", report.loaded.len()));
            }
            Ok(())
        },
        Err(ExtensionError::Busy { .. }) => {
            inv.print_error("Extensions are busy. Try again in a moment.");
            Ok(())
        },
        Err(e) => Err(CommandError::handler(e)),
    }
}

fn unload(host: &WeakHostContext, inv: &Invocation) -> Result<(), CommandError> {
    let host = upgrade(host)?;
    if host.unload.set() {
        inv.print("Unloading...");
    }
    Ok(())
}

fn status(host: &WeakHostContext, lifecycle: &Lifecycle, inv: &Invocation) -> Result<(), CommandError> {
    let host = upgrade(host)?;
    if let Some(manager) = lifecycle.upgrade() {
        inv.print(&format!("Extensions: {:?}, {} loaded", manager.state(), manager.loaded().len()));
    }
    inv.print(&format!("Commands: {}", host.registry.len()));
    inv.print(&format!("Background tasks: {}", host.tasks.active()));
    inv.print(&format!("Feature flags: {:#x}", host.feature_flags().bits()));
    inv.print(&format!("Document: {}", host.store.path().display()));
    Ok(())
}
