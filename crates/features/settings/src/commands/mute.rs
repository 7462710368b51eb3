use crate::store::ConfigurationStore;
use harbor_commands::{CommandError, Invocation};

pub(super) fn mute(store: &ConfigurationStore, inv: &Invocation) -> Result<(), CommandError> {
    let text = inv.args.trim();
    if text.is_empty() {
        inv.print("Usage: /xlmute <word or phrase>");
        return Ok(());
    }

    let added = store.update(|doc| {
        let list = doc.mute_list_mut();
        if list.iter().any(|entry| entry == text) {
            return None;
        }
        list.push(text.to_owned());
        Some(())
    })?;

    match added {
        Some(()) => inv.print(&format!("Muted \"{text}\".")),
        None => inv.print(&format!("\"{text}\" is already muted.")),
    }
    Ok(())
}

pub(super) fn unmute(store: &ConfigurationStore, inv: &Invocation) -> Result<(), CommandError> {
    let text = inv.args.trim();
    if text.is_empty() {
        inv.print("Usage: /xlunmute <word or phrase>");
        return Ok(());
    }

    let removed = store.update(|doc| {
        let list = doc.mute_list_mut();
        let before = list.len();
        list.retain(|entry| entry != text);
        let removed = before - list.len();
        (removed > 0).then_some(removed)
    })?;

    match removed {
        Some(_) => inv.print(&format!("Unmuted \"{text}\".")),
        None => inv.print(&format!("\"{text}\" is not muted.")),
    }
    Ok(())
}

pub(super) fn list(store: &ConfigurationStore, inv: &Invocation) -> Result<(), CommandError> {
    let entries = store.read(|doc| doc.mute_list().to_vec());
    if entries.is_empty() {
        inv.print("The mute list is empty.");
    }
    for entry in entries {
        inv.print(&format!("\"{entry}\""));
    }
    Ok(())
}
