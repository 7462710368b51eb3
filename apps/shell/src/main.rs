use anyhow::Context;
use harbor::domain::HostSettings;
use harbor::kernel::config::load_config;
use harbor::kernel::lookup::{CatalogResolver, NameResolver};
use harbor::{Orchestrator, SubsystemStage};
use harbor_shell::{ConsoleOutput, ProcessIntrospection, RichPresence};
use std::sync::Arc;
use tracing::info;

#[harbor_runtime::main(host)]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let settings: HostSettings =
        load_config(path.as_deref()).context("Critical: settings are malformed")?;

    let _logger = harbor_shell::init_logging(&settings.logging)?;

    if let Some(launch) = &settings.launch {
        info!(command_line = %launch.command_line(), flags = launch.creation_flags, "Launch configuration loaded");
    }

    let resolver: Arc<dyn NameResolver> = match &settings.lookup.catalog {
        Some(catalog) => Arc::new(CatalogResolver::from_file(catalog).context("Loading lookup catalog")?),
        None => Arc::new(CatalogResolver::new()),
    };

    let host = Arc::new(
        Orchestrator::builder(settings, Arc::new(ConsoleOutput))
            .resolver(resolver)
            .subsystem(SubsystemStage::Introspection, ProcessIntrospection::default())
            .subsystem(SubsystemStage::ChatNetwork, RichPresence::default())
            .build()?,
    );
    host.start()?;

    harbor_shell::spawn_input(Arc::clone(&host))?;

    let waiter = Arc::clone(&host);
    tokio::task::spawn_blocking(move || waiter.wait_for_unload()).await?;

    host.dispose();
    Ok(())
}
