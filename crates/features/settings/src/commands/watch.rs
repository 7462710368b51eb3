use super::SettingsContext;
use crate::error::{SettingsError, SettingsErrorExt};
use crate::store::ConfigurationStore;
use harbor_commands::{CommandError, Invocation};
use harbor_domain::WatchListEntry;
use harbor_kernel::lookup::{LookupCategory, NameResolver};
use harbor_kernel::output::OutputChannel;
use std::sync::Arc;
use tracing::debug;

const USAGE: &str = "Usage: /xlwatch add <name> | remove <name|id> | list";

pub(super) fn run(context: &SettingsContext, inv: &Invocation) -> Result<(), CommandError> {
    let (action, rest) = inv.subcommand();
    match (action.to_ascii_lowercase().as_str(), rest) {
        ("add", name) if !name.is_empty() => {
            add(context, inv, name);
            Ok(())
        },
        ("remove", target) if !target.is_empty() => remove(context, inv, target),
        ("list", _) => {
            list(context, inv);
            Ok(())
        },
        _ => {
            inv.print(USAGE);
            Ok(())
        },
    }
}

/// Resolves `name` off the dispatch path and appends the best match.
fn add(context: &SettingsContext, inv: &Invocation, name: &str) {
    let store = Arc::clone(&context.store);
    let resolver = Arc::clone(&context.resolver);
    let output = inv.output();
    let query = name.to_owned();

    debug!(query = %query, "Scheduling watch list lookup");
    context.tasks.spawn(format!("watch-add:{query}"), async move {
        let outcome = add_top_match(&store, resolver.as_ref(), output.as_ref(), &query).await;
        if outcome.is_err() {
            output.print_error(&format!(
                "Could not add \"{query}\" to the watch list. Check the log for details."
            ));
        }
        outcome
    });
}

async fn add_top_match(
    store: &ConfigurationStore,
    resolver: &dyn NameResolver,
    output: &dyn OutputChannel,
    query: &str,
) -> Result<(), SettingsError> {
    let candidates = resolver
        .resolve(query, LookupCategory::World)
        .await
        .context(format!("Resolving \"{query}\""))?;

    let Some(top) = candidates.into_iter().next() else {
        output.print(&format!("\"{query}\" was not found."));
        return Ok(());
    };

    let added = store.update(|doc| {
        let list = doc.watch_list_mut();
        if list.iter().any(|entry| entry.id == top.id) {
            return None;
        }
        list.push(WatchListEntry::new(top.id, top.name.clone()));
        Some(())
    })?;

    match added {
        Some(()) => output.print(&format!("Added {} ({}) to the watch list.", top.name, top.id)),
        None => output.print(&format!("{} is already on the watch list.", top.name)),
    }
    Ok(())
}

/// Removes by local name or numeric id; anything else is resolved first and
/// removed by the top match's id.
fn remove(context: &SettingsContext, inv: &Invocation, target: &str) -> Result<(), CommandError> {
    let local = context.store.read(|doc| {
        doc.watch_list().iter().find(|entry| entry.name.eq_ignore_ascii_case(target)).map(|entry| entry.id)
    });
    let Some(id) = local.or_else(|| target.parse::<u32>().ok()) else {
        remove_resolved(context, inv, target);
        return Ok(());
    };

    match remove_id(&context.store, id)? {
        Some(entry) => inv.print(&removed_line(&entry)),
        None => inv.print(&format!("\"{target}\" is not on the watch list.")),
    }
    Ok(())
}

fn remove_resolved(context: &SettingsContext, inv: &Invocation, target: &str) {
    let store = Arc::clone(&context.store);
    let resolver = Arc::clone(&context.resolver);
    let output = inv.output();
    let query = target.to_owned();

    debug!(query = %query, "Scheduling watch list removal lookup");
    context.tasks.spawn(format!("watch-remove:{query}"), async move {
        let outcome = remove_top_match(&store, resolver.as_ref(), output.as_ref(), &query).await;
        if outcome.is_err() {
            output.print_error(&format!(
                "Could not remove \"{query}\" from the watch list. Check the log for details."
            ));
        }
        outcome
    });
}

async fn remove_top_match(
    store: &ConfigurationStore,
    resolver: &dyn NameResolver,
    output: &dyn OutputChannel,
    query: &str,
) -> Result<(), SettingsError> {
    let candidates = resolver
        .resolve(query, LookupCategory::World)
        .await
        .context(format!("Resolving \"{query}\""))?;

    let removed = match candidates.first() {
        Some(top) => remove_id(store, top.id)?,
        None => None,
    };
    match removed {
        Some(entry) => output.print(&removed_line(&entry)),
        None => output.print(&format!("\"{query}\" is not on the watch list.")),
    }
    Ok(())
}

fn remove_id(store: &ConfigurationStore, id: u32) -> Result<Option<WatchListEntry>, SettingsError> {
    store.update(|doc| {
        let list = doc.watch_list_mut();
        let position = list.iter().position(|entry| entry.id == id)?;
        let entry = list.remove(position);
        list.retain(|other| other.id != id);
        Some(entry)
    })
}

fn removed_line(entry: &WatchListEntry) -> String {
    format!("Removed {} ({}) from the watch list.", entry.name, entry.id)
}

fn list(context: &SettingsContext, inv: &Invocation) {
    let entries = context.store.read(|doc| doc.watch_list().to_vec());
    if entries.is_empty() {
        inv.print("The watch list is empty.");
    }
    for entry in entries {
        inv.print(&format!("{} ({})", entry.name, entry.id));
    }
}
