//! Commands that read and mutate the configuration document.
//!
//! Each mutating command lazily creates its collection, resolves its input,
//! changes the document, saves it and confirms to the user.

mod flags;
mod mute;
mod watch;

use crate::store::ConfigurationStore;
use harbor_commands::{CommandError, CommandRegistry};
use harbor_domain::constants::{FLAGS, MUTE, MUTE_LIST, UNMUTE, WATCH};
use harbor_kernel::lookup::NameResolver;
use harbor_runtime::BackgroundTasks;
use std::sync::Arc;

/// Shared state captured by the settings command handlers.
#[derive(Debug, Clone)]
pub struct SettingsContext {
    pub store: Arc<ConfigurationStore>,
    pub resolver: Arc<dyn NameResolver>,
    pub tasks: BackgroundTasks,
}

/// Registers the mute, watch-list and feature-flag commands.
///
/// # Errors
/// [`CommandError::Duplicate`] when one of the names is already taken.
pub fn register_commands(registry: &CommandRegistry, context: &SettingsContext) -> Result<(), CommandError> {
    let store = Arc::clone(&context.store);
    registry.register(MUTE, move |inv| mute::mute(&store, inv), "Mutes a word or phrase: /xlmute <text>", true)?;

    let store = Arc::clone(&context.store);
    registry.register(
        UNMUTE,
        move |inv| mute::unmute(&store, inv),
        "Removes every exact match from the mute list: /xlunmute <text>",
        true,
    )?;

    let store = Arc::clone(&context.store);
    registry.register(MUTE_LIST, move |inv| mute::list(&store, inv), "Lists muted words and phrases.", true)?;

    let watch = context.clone();
    registry.register(
        WATCH,
        move |inv| watch::run(&watch, inv),
        "Manages the world watch list: /xlwatch add <name> | remove <name|id> | list",
        true,
    )?;

    let store = Arc::clone(&context.store);
    registry.register(
        FLAGS,
        move |inv| flags::run(&store, inv),
        "Toggles optional features: /xlflags setall | unsetall | set <name> | unset <name> | toggle <name> | list",
        true,
    )?;

    Ok(())
}
