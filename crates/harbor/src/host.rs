//! What the host shares with its command handlers and extensions.

use harbor_commands::{CommandError, CommandOwner, CommandRegistry, Invocation};
use harbor_domain::{FeatureFlags, HostSettings};
use harbor_extensions::{ExtensionHost, ExtensionManifest};
use harbor_kernel::lookup::NameResolver;
use harbor_kernel::output::OutputChannel;
use harbor_runtime::{BackgroundTasks, UnloadSignal};
use harbor_settings::ConfigurationStore;
use std::ops::Deref;
use std::sync::{Arc, Weak};
use tracing::debug;

#[derive(Debug)]
pub struct HostInner {
    pub settings: HostSettings,
    pub registry: Arc<CommandRegistry>,
    pub output: Arc<dyn OutputChannel>,
    pub store: Arc<ConfigurationStore>,
    pub resolver: Arc<dyn NameResolver>,
    pub tasks: BackgroundTasks,
    pub unload: UnloadSignal,
}

/// Thin Arc-wrapped host state for inexpensive cloning into handlers.
#[derive(Debug, Clone)]
pub struct HostContext {
    inner: Arc<HostInner>,
}

impl Deref for HostContext {
    type Target = HostInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl HostContext {
    pub(crate) fn new(inner: HostInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// A non-owning reference for handlers stored in the registry.
    #[must_use]
    pub fn downgrade(&self) -> WeakHostContext {
        WeakHostContext { inner: Arc::downgrade(&self.inner) }
    }

    #[must_use]
    pub fn feature_flags(&self) -> FeatureFlags {
        self.store.read(|doc| doc.feature_flags)
    }
}

#[derive(Debug, Clone)]
pub struct WeakHostContext {
    inner: Weak<HostInner>,
}

impl WeakHostContext {
    #[must_use]
    pub fn upgrade(&self) -> Option<HostContext> {
        self.inner.upgrade().map(|inner| HostContext { inner })
    }
}

impl ExtensionHost for HostContext {
    type Handle = HostHandle;

    fn handle_for(&self, manifest: &ExtensionManifest) -> HostHandle {
        HostHandle { owner: CommandOwner::Extension(manifest.id.clone()), host: self.clone() }
    }

    fn release(&self, id: &str) {
        let removed = self.registry.remove_owned_by(&CommandOwner::Extension(id.to_owned()));
        if removed > 0 {
            debug!(extension = %id, removed, "Extension commands released");
        }
    }

    fn report(&self, message: &str) {
        self.output.print_error(message);
    }
}

/// The host as seen by one extension.
///
/// Commands registered through the handle belong to the extension and are
/// removed when it unloads.
#[derive(Debug, Clone)]
pub struct HostHandle {
    owner: CommandOwner,
    host: HostContext,
}

impl HostHandle {
    #[must_use]
    pub fn owner(&self) -> &CommandOwner {
        &self.owner
    }

    /// Registers a command owned by this extension.
    ///
    /// # Errors
    /// [`CommandError::Duplicate`] when the name is taken.
    pub fn register_command<F>(
        &self,
        name: impl Into<String>,
        handler: F,
        help: impl Into<String>,
        visible: bool,
    ) -> Result<(), CommandError>
    where
        F: Fn(&Invocation) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.host.registry.register_owned(name, handler, help, visible, self.owner.clone())
    }

    pub fn print(&self, message: &str) {
        self.host.output.print(message);
    }

    pub fn print_error(&self, message: &str) {
        self.host.output.print_error(message);
    }

    #[must_use]
    pub fn output(&self) -> Arc<dyn OutputChannel> {
        Arc::clone(&self.host.output)
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ConfigurationStore> {
        &self.host.store
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn NameResolver> {
        &self.host.resolver
    }

    #[must_use]
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.host.tasks
    }

    #[must_use]
    pub fn feature_flags(&self) -> FeatureFlags {
        self.host.feature_flags()
    }

    /// Asks the host to shut down. Returns `false` if it already was asked.
    pub fn request_unload(&self) -> bool {
        self.host.unload.set()
    }
}
