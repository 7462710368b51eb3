use crate::manifest::ExtensionManifest;
use std::error::Error;

pub type ModuleResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A loaded extension.
///
/// `H` is the per-extension handle the host gives a module at load time. A
/// module keeps whatever it needs from the handle and lets it go in `dispose`.
pub trait ExtensionModule<H>: Send {
    fn name(&self) -> &str;

    fn initialize(&mut self, host: &H) -> ModuleResult;

    fn dispose(&mut self) -> ModuleResult {
        Ok(())
    }
}

/// Builds a module for a manifest whose `entry` it was registered under.
pub type ExtensionFactory<H> =
    Box<dyn Fn(&ExtensionManifest) -> Box<dyn ExtensionModule<H>> + Send + Sync>;

/// The host side of the lifecycle: hands out handles and cleans up after modules.
pub trait ExtensionHost {
    type Handle;

    /// A handle scoped to one extension.
    fn handle_for(&self, manifest: &ExtensionManifest) -> Self::Handle;

    /// Drops everything the extension registered through its handle.
    fn release(&self, id: &str);

    /// Shows a failure to the user.
    fn report(&self, message: &str);
}
