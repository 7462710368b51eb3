//! The orchestrator: builds the host in dependency order, starts it, and
//! tears it down in reverse.

use crate::builtins;
use crate::error::HarborError;
use crate::host::{HostContext, HostHandle, HostInner};
use crate::subsystem::{Subsystem, SubsystemResult, SubsystemStage};
use harbor_commands::{CommandRegistry, CommandRouter, DispatchOutcome};
use harbor_domain::HostSettings;
use harbor_extensions::{ExtensionManifest, ExtensionModule, LifecycleManager, LoadReport, LoadedExtension};
use harbor_kernel::fault::isolate;
use harbor_kernel::lookup::{CatalogResolver, NameResolver};
use harbor_kernel::output::OutputChannel;
use harbor_runtime::{BackgroundTasks, UnloadSignal};
use harbor_settings::{ConfigurationStore, SettingsContext};
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Constructed,
    Started,
    /// The unload signal fired; waiting for `dispose`.
    Unloading,
    Disposed,
}

type Factory = Box<dyn Fn(&ExtensionManifest) -> Box<dyn ExtensionModule<HostHandle>> + Send + Sync>;

/// Collects the host's collaborators before construction.
pub struct OrchestratorBuilder {
    settings: HostSettings,
    output: Arc<dyn OutputChannel>,
    resolver: Option<Arc<dyn NameResolver>>,
    runtime: Option<Handle>,
    subsystems: Vec<(SubsystemStage, Box<dyn Subsystem>)>,
    factories: Vec<(String, Factory)>,
    embedded: Vec<ExtensionManifest>,
}

impl Debug for OrchestratorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestratorBuilder")
            .field("subsystems", &self.subsystems)
            .field("factories", &self.factories.iter().map(|(entry, _)| entry).collect::<Vec<_>>())
            .field("embedded", &self.embedded)
            .finish_non_exhaustive()
    }
}

impl OrchestratorBuilder {
    pub fn new(settings: HostSettings, output: Arc<dyn OutputChannel>) -> Self {
        Self {
            settings,
            output,
            resolver: None,
            runtime: None,
            subsystems: Vec::new(),
            factories: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// Name resolver for `/xlwatch add`. Defaults to an empty catalog.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Runtime for background tasks. Defaults to the runtime of the caller.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn subsystem(mut self, stage: SubsystemStage, subsystem: impl Subsystem + 'static) -> Self {
        self.subsystems.push((stage, Box::new(subsystem)));
        self
    }

    /// Registers a compiled-in extension factory for manifests with this `entry`.
    #[must_use]
    pub fn extension<F>(mut self, entry: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ExtensionManifest) -> Box<dyn ExtensionModule<HostHandle>> + Send + Sync + 'static,
    {
        self.factories.push((entry.into(), Box::new(factory)));
        self
    }

    /// A manifest that loads without a file on disk.
    #[must_use]
    pub fn embedded_extension(mut self, manifest: ExtensionManifest) -> Self {
        self.embedded.push(manifest);
        self
    }

    /// Constructs the host and loads extensions.
    ///
    /// Order: introspection subsystems, hook subsystems, command registry with
    /// the built-in and settings commands, chat/network subsystems, the
    /// extension lifecycle manager. Extension loading runs behind a fault
    /// boundary; nothing it does fails construction.
    ///
    /// # Errors
    /// Wiring failures: no runtime, an unreadable configuration document, a
    /// duplicate command name or a duplicate extension entry point.
    pub fn build(self) -> Result<Orchestrator, HarborError> {
        let Self { settings, output, resolver, runtime, mut subsystems, factories, embedded } = self;

        let runtime = runtime.or_else(|| Handle::try_current().ok()).ok_or_else(|| HarborError::Runtime {
            message: "build inside a Tokio runtime or pass a handle".into(),
            context: None,
        })?;
        let store = Arc::new(ConfigurationStore::open(settings.document.path.clone())?);
        let resolver = resolver.unwrap_or_else(|| Arc::new(CatalogResolver::new()));

        subsystems.sort_by_key(|(stage, _)| *stage);
        let (early, late): (Vec<_>, Vec<_>) =
            subsystems.into_iter().partition(|(stage, _)| *stage < SubsystemStage::ChatNetwork);
        for (stage, subsystem) in &early {
            debug!(subsystem = subsystem.name(), %stage, "Subsystem constructed");
        }

        let registry = Arc::new(CommandRegistry::new());
        let host = HostContext::new(HostInner {
            settings: settings.clone(),
            registry: Arc::clone(&registry),
            output: Arc::clone(&output),
            store: Arc::clone(&store),
            resolver: Arc::clone(&resolver),
            tasks: BackgroundTasks::new(runtime),
            unload: UnloadSignal::new(),
        });

        let lifecycle = Arc::new(
            embedded.into_iter().fold(
                LifecycleManager::<HostHandle>::new(
                    settings.extensions.primary_dir.clone(),
                    settings.extensions.fallback_dir.clone(),
                ),
                LifecycleManager::with_embedded,
            ),
        );

        builtins::register(&registry, &host, &Arc::downgrade(&lifecycle))?;
        let context = SettingsContext { store, resolver, tasks: host.tasks.clone() };
        harbor_settings::register_commands(&registry, &context)?;
        info!(commands = registry.len(), "Commands registered");

        for (stage, subsystem) in &late {
            debug!(subsystem = subsystem.name(), %stage, "Subsystem constructed");
        }

        for (entry, factory) in factories {
            lifecycle.register_factory(entry, factory)?;
        }

        let orchestrator = Orchestrator {
            router: CommandRouter::new(registry, output),
            host,
            lifecycle,
            subsystems: early.into_iter().chain(late).collect(),
            state: Mutex::new(OrchestratorState::Constructed),
        };
        orchestrator.load_extensions();
        Ok(orchestrator)
    }
}

/// Owns every host component and sequences their lifetimes.
pub struct Orchestrator {
    host: HostContext,
    router: CommandRouter,
    lifecycle: Arc<LifecycleManager<HostHandle>>,
    subsystems: Vec<(SubsystemStage, Box<dyn Subsystem>)>,
    state: Mutex<OrchestratorState>,
}

impl Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state())
            .field("subsystems", &self.subsystems)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn builder(settings: HostSettings, output: Arc<dyn OutputChannel>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(settings, output)
    }

    fn load_extensions(&self) {
        match isolate(|| self.lifecycle.load_all(&self.host)) {
            Ok(Ok(report)) => log_report("Extensions loaded", &report),
            Ok(Err(e)) => {
                error!(error = %e, "Extension loading failed");
                self.host.output.print_error("Extension loading failed. Check the log for details.");
            },
            Err(panic) => {
                error!(panic = %panic, "Extension loading panicked");
                self.host.output.print_error("Extension loading failed. Check the log for details.");
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        let state = *self.state.lock();
        if state != OrchestratorState::Disposed && self.host.unload.is_set() {
            return OrchestratorState::Unloading;
        }
        state
    }

    /// Enables subsystems in construction order. Subsystems gated by a flag
    /// the document does not enable stay off.
    ///
    /// # Errors
    /// [`HarborError::InvalidState`] unless freshly constructed;
    /// [`HarborError::Subsystem`] when an ungated subsystem fails to enable.
    pub fn start(&self) -> Result<(), HarborError> {
        let mut state = self.state.lock();
        if *state != OrchestratorState::Constructed {
            return Err(HarborError::InvalidState {
                message: format!("cannot start from {:?}", *state).into(),
                context: None,
            });
        }

        let flags = self.host.feature_flags();
        for (_, subsystem) in &self.subsystems {
            let name = subsystem.name();
            if let Some(flag) = subsystem.required_flag() {
                if !flags.contains(flag) {
                    debug!(subsystem = name, flag = ?flag, "Subsystem left disabled");
                    continue;
                }
                if let Err(e) = flatten(isolate(|| subsystem.enable())) {
                    warn!(subsystem = name, error = %e, "Optional subsystem failed to enable");
                    self.host.output.print_error(&format!("{name} could not be enabled. Check the log for details."));
                }
                continue;
            }

            flatten(isolate(|| subsystem.enable())).map_err(|e| HarborError::Subsystem {
                message: format!("{name}: {e}").into(),
                context: Some("Enabling subsystems".into()),
            })?;
            debug!(subsystem = name, "Subsystem enabled");
        }

        *state = OrchestratorState::Started;
        info!(subsystems = self.subsystems.len(), "Host started");
        Ok(())
    }

    /// Routes one input line.
    pub fn dispatch(&self, raw: &str) -> DispatchOutcome {
        self.router.dispatch(raw)
    }

    /// Fires the one-shot unload signal. Returns `false` if already fired.
    pub fn request_unload(&self) -> bool {
        self.host.unload.set()
    }

    /// Blocks the calling thread until an unload is requested. No timeout.
    pub fn wait_for_unload(&self) {
        self.host.unload.wait();
    }

    #[must_use]
    pub fn unload_signal(&self) -> UnloadSignal {
        self.host.unload.clone()
    }

    #[must_use]
    pub fn host(&self) -> &HostContext {
        &self.host
    }

    #[must_use]
    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ConfigurationStore> {
        &self.host.store
    }

    #[must_use]
    pub fn extensions(&self) -> Vec<LoadedExtension> {
        self.lifecycle.loaded()
    }

    /// Reloads every extension.
    ///
    /// # Errors
    /// [`HarborError::Extension`] when another lifecycle call is running.
    pub fn reload_extensions(&self) -> Result<LoadReport, HarborError> {
        let report = self.lifecycle.reload(&self.host)?;
        log_report("Extensions reloaded", &report);
        Ok(report)
    }

    /// Tears the host down in reverse construction order: extensions and
    /// their background tasks, chat/network subsystems, commands, then hook
    /// and introspection subsystems. Waits for a running extension transition
    /// to finish first. Later calls do nothing.
    pub fn dispose(&self) {
        {
            let mut state = self.state.lock();
            if *state == OrchestratorState::Disposed {
                return;
            }
            *state = OrchestratorState::Disposed;
        }
        self.host.unload.set();
        info!("Disposing host");

        let report = self.lifecycle.shutdown(&self.host);
        log_report("Extensions unloaded", &report);

        let aborted = self.host.tasks.abort_all();
        if aborted > 0 {
            debug!(aborted, "Background tasks aborted");
        }

        let (late, early): (Vec<_>, Vec<_>) =
            self.subsystems.iter().partition(|(stage, _)| *stage >= SubsystemStage::ChatNetwork);
        dispose_subsystems(&late);
        self.host.registry.clear();
        debug!("Commands cleared");
        dispose_subsystems(&early);

        info!("Host disposed");
    }
}

fn dispose_subsystems(subsystems: &[&(SubsystemStage, Box<dyn Subsystem>)]) {
    for (stage, subsystem) in subsystems.iter().rev() {
        if let Err(e) = flatten(isolate(|| subsystem.dispose())) {
            error!(subsystem = subsystem.name(), %stage, error = %e, "Subsystem dispose failed");
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn flatten(outcome: Result<SubsystemResult, String>) -> Result<(), String> {
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => Err(format!("panicked: {panic}")),
    }
}

fn log_report(what: &str, report: &LoadReport) {
    info!(
        loaded = report.loaded.len(),
        disposed = report.disposed.len(),
        skipped = report.skipped.len(),
        failures = report.failures.len(),
        "{what}"
    );
}
