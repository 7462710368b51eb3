use crate::store::ConfigurationStore;
use harbor_commands::{CommandError, Invocation};
use harbor_domain::FeatureFlags;

const USAGE: &str = "Usage: /xlflags setall | unsetall | set <name> | unset <name> | toggle <name> | list";

pub(super) fn run(store: &ConfigurationStore, inv: &Invocation) -> Result<(), CommandError> {
    let (action, name) = inv.subcommand();

    match action.to_ascii_lowercase().as_str() {
        "setall" => {
            store.mutate(|doc| doc.feature_flags.insert(FeatureFlags::every_variant()))?;
            inv.print("Enabled every feature flag.");
        },
        "unsetall" => {
            store.mutate(|doc| doc.feature_flags.remove(FeatureFlags::every_variant()))?;
            inv.print("Disabled every feature flag.");
        },
        "set" | "unset" | "toggle" => {
            let Some(flag) = FeatureFlags::from_canonical_name(name) else {
                inv.print_error(&format!("Unknown feature flag: {name}"));
                return Ok(());
            };
            let label = flag.canonical_name().unwrap_or(name);

            let enabled = store.mutate(|doc| {
                match action.to_ascii_lowercase().as_str() {
                    "set" => doc.feature_flags.insert(flag),
                    "unset" => doc.feature_flags.remove(flag),
                    _ => doc.feature_flags.toggle(flag),
                }
                doc.feature_flags.contains(flag)
            })?;

            let state = if enabled { "enabled" } else { "disabled" };
            inv.print(&format!("{label} is now {state}."));
        },
        "list" => {
            let flags = store.read(|doc| doc.feature_flags);
            let mut any = false;
            for name in flags.enabled_names() {
                inv.print(name);
                any = true;
            }
            if !any {
                inv.print("No feature flags enabled.");
            }
        },
        _ => inv.print(USAGE),
    }
    Ok(())
}
