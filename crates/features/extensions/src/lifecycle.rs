//! The extension lifecycle manager.
//!
//! Every call into module code (factory, `initialize`, `dispose`) runs inside
//! a fault boundary. A failing module is logged, reported to the host and
//! recorded in the returned [`LoadReport`]; the remaining modules are
//! unaffected.

use crate::discovery::discover_manifests;
use crate::error::ExtensionError;
use crate::manifest::ExtensionManifest;
use crate::module::{ExtensionFactory, ExtensionHost, ExtensionModule};
use fxhash::{FxHashMap, FxHashSet};
use harbor_kernel::fault::isolate;
use parking_lot::{Mutex, RwLock};
use std::fmt::{self, Debug, Display};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

/// Which step of an extension's life failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Discover,
    Manifest,
    Create,
    Initialize,
    Dispose,
}

impl Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discover => "discover",
            Self::Manifest => "manifest",
            Self::Create => "create",
            Self::Initialize => "initialize",
            Self::Dispose => "dispose",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFailure {
    /// Extension id, or the offending path when no id is known.
    pub subject: String,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    /// Same id already found in a higher-priority directory.
    Shadowed,
    AlreadyLoaded,
}

/// Outcome of one lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub disposed: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    pub failures: Vec<ExtensionFailure>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Id, name and version of a loaded extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedExtension {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
}

struct Slot<H> {
    manifest: ExtensionManifest,
    module: Box<dyn ExtensionModule<H>>,
}

/// Loads, unloads and reloads extension modules.
///
/// Transitions are single-flight: a call made while another is running,
/// including one made from inside a module's own `initialize`, fails with
/// [`ExtensionError::Busy`] and leaves the module set alone.
pub struct LifecycleManager<H> {
    primary_dir: PathBuf,
    fallback_dir: Option<PathBuf>,
    embedded: Vec<ExtensionManifest>,
    factories: RwLock<FxHashMap<String, ExtensionFactory<H>>>,
    slots: Mutex<Vec<Slot<H>>>,
    state: Mutex<LifecycleState>,
    transition: Mutex<()>,
}

impl<H> Debug for LifecycleManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("primary_dir", &self.primary_dir)
            .field("fallback_dir", &self.fallback_dir)
            .field("state", &self.state())
            .field("loaded", &self.slots.lock().len())
            .finish_non_exhaustive()
    }
}

impl<H> LifecycleManager<H> {
    pub fn new(primary_dir: impl Into<PathBuf>, fallback_dir: Option<PathBuf>) -> Self {
        Self {
            primary_dir: primary_dir.into(),
            fallback_dir,
            embedded: Vec::new(),
            factories: RwLock::default(),
            slots: Mutex::default(),
            state: Mutex::new(LifecycleState::Unloaded),
            transition: Mutex::new(()),
        }
    }

    /// Adds a manifest that needs no file on disk. Embedded manifests have
    /// the lowest priority: any directory manifest with the same id wins.
    #[must_use]
    pub fn with_embedded(mut self, manifest: ExtensionManifest) -> Self {
        self.embedded.push(manifest);
        self
    }

    /// Registers the factory for manifests whose `entry` equals `entry`.
    ///
    /// # Errors
    /// [`ExtensionError::DuplicateEntry`] when `entry` already has a factory.
    pub fn register_factory<F>(&self, entry: impl Into<String>, factory: F) -> Result<(), ExtensionError>
    where
        F: Fn(&ExtensionManifest) -> Box<dyn ExtensionModule<H>> + Send + Sync + 'static,
    {
        let entry = entry.into();
        let mut factories = self.factories.write();
        if factories.contains_key(&entry) {
            return Err(ExtensionError::DuplicateEntry { message: entry.into(), context: None });
        }
        debug!(entry = %entry, "Extension factory registered");
        factories.insert(entry, Box::new(factory));
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// Loaded extensions in load order.
    #[must_use]
    pub fn loaded(&self) -> Vec<LoadedExtension> {
        self.slots
            .lock()
            .iter()
            .map(|slot| LoadedExtension {
                id: slot.manifest.id.clone(),
                name: slot.manifest.display_name().to_owned(),
                version: slot.manifest.version.clone(),
            })
            .collect()
    }

    /// Discovers and loads every enabled extension not loaded yet.
    ///
    /// # Errors
    /// Only [`ExtensionError::Busy`]; module failures are in the report.
    pub fn load_all<X>(&self, host: &X) -> Result<LoadReport, ExtensionError>
    where
        X: ExtensionHost<Handle = H>,
    {
        let _transition = self.transition.try_lock().ok_or(ExtensionError::Busy { context: None })?;
        let mut report = LoadReport::default();
        self.load_locked(host, &mut report);
        Ok(report)
    }

    /// Disposes every loaded module in reverse load order.
    ///
    /// # Errors
    /// Only [`ExtensionError::Busy`]; dispose failures are in the report.
    pub fn unload_all<X>(&self, host: &X) -> Result<LoadReport, ExtensionError>
    where
        X: ExtensionHost<Handle = H>,
    {
        let _transition = self.transition.try_lock().ok_or(ExtensionError::Busy { context: None })?;
        let mut report = LoadReport::default();
        self.unload_locked(host, &mut report);
        Ok(report)
    }

    /// Like `unload_all`, but waits for a running transition to finish
    /// instead of failing with `Busy`.
    ///
    /// Must not be called from inside a module's `initialize` or `dispose`.
    pub fn shutdown<X>(&self, host: &X) -> LoadReport
    where
        X: ExtensionHost<Handle = H>,
    {
        let _transition = self.transition.lock();
        let mut report = LoadReport::default();
        self.unload_locked(host, &mut report);
        report
    }

    /// `unload_all` followed by `load_all` as one transition.
    ///
    /// # Errors
    /// Only [`ExtensionError::Busy`].
    pub fn reload<X>(&self, host: &X) -> Result<LoadReport, ExtensionError>
    where
        X: ExtensionHost<Handle = H>,
    {
        let _transition = self.transition.try_lock().ok_or(ExtensionError::Busy { context: None })?;
        let mut report = LoadReport::default();
        self.unload_locked(host, &mut report);
        self.load_locked(host, &mut report);
        info!(
            loaded = report.loaded.len(),
            disposed = report.disposed.len(),
            failures = report.failures.len(),
            "Extensions reloaded"
        );
        Ok(report)
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock() = state;
    }

    fn settle(&self) {
        let loaded = !self.slots.lock().is_empty();
        self.set_state(if loaded { LifecycleState::Loaded } else { LifecycleState::Unloaded });
    }

    fn candidates<X>(&self, host: &X, report: &mut LoadReport) -> Vec<ExtensionManifest>
    where
        X: ExtensionHost<Handle = H>,
    {
        let dirs = std::iter::once(&self.primary_dir).chain(self.fallback_dir.as_ref());
        let mut manifests = Vec::new();

        for dir in dirs {
            let paths = match discover_manifests(dir) {
                Ok(paths) => paths,
                Err(e) => {
                    fail(host, report, dir.display().to_string(), FailureStage::Discover, &e.to_string());
                    continue;
                },
            };
            for path in paths {
                match ExtensionManifest::load(&path) {
                    Ok(manifest) => manifests.push(manifest),
                    Err(e) => {
                        fail(host, report, path.display().to_string(), FailureStage::Manifest, &e.to_string());
                    },
                }
            }
        }

        manifests.extend(self.embedded.iter().cloned());
        manifests
    }

    fn load_locked<X>(&self, host: &X, report: &mut LoadReport)
    where
        X: ExtensionHost<Handle = H>,
    {
        self.set_state(LifecycleState::Loading);

        let mut seen: FxHashSet<String> =
            self.slots.lock().iter().map(|slot| slot.manifest.id.clone()).collect();
        let already_loaded = seen.clone();

        for manifest in self.candidates(host, report) {
            let id = manifest.id.clone();
            if !seen.insert(id.clone()) {
                let reason = if already_loaded.contains(&id) {
                    SkipReason::AlreadyLoaded
                } else {
                    SkipReason::Shadowed
                };
                debug!(extension = %id, path = %manifest.path.display(), ?reason, "Extension skipped");
                report.skipped.push((id, reason));
                continue;
            }
            if !manifest.enabled {
                debug!(extension = %id, "Extension disabled");
                report.skipped.push((id, SkipReason::Disabled));
                continue;
            }

            if let Some(slot) = self.start_module(host, manifest, report) {
                report.loaded.push(id);
                self.slots.lock().push(slot);
            }
        }

        self.settle();
    }

    fn start_module<X>(&self, host: &X, manifest: ExtensionManifest, report: &mut LoadReport) -> Option<Slot<H>>
    where
        X: ExtensionHost<Handle = H>,
    {
        let id = manifest.id.clone();

        let created = {
            let factories = self.factories.read();
            let Some(factory) = factories.get(&manifest.entry) else {
                let message = format!("no factory for entry '{}'", manifest.entry);
                fail(host, report, id, FailureStage::Create, &message);
                return None;
            };
            isolate(|| factory(&manifest))
        };
        let mut module = match created {
            Ok(module) => module,
            Err(panic) => {
                fail(host, report, id, FailureStage::Create, &format!("factory panicked: {panic}"));
                return None;
            },
        };

        let handle = host.handle_for(&manifest);
        let failure = match isolate(|| module.initialize(&handle)) {
            Ok(Ok(())) => {
                info!(extension = %id, name = module.name(), "Extension loaded");
                return Some(Slot { manifest, module });
            },
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("initialize panicked: {panic}"),
        };

        fail(host, report, id.clone(), FailureStage::Initialize, &failure);
        if let Err(panic) = isolate(|| module.dispose()) {
            warn!(extension = %id, panic = %panic, "Dispose after failed initialize panicked");
        }
        host.release(&id);
        None
    }

    fn unload_locked<X>(&self, host: &X, report: &mut LoadReport)
    where
        X: ExtensionHost<Handle = H>,
    {
        self.set_state(LifecycleState::Unloading);
        let slots = std::mem::take(&mut *self.slots.lock());

        for Slot { manifest, mut module } in slots.into_iter().rev() {
            let id = manifest.id;
            let failure = match isolate(|| module.dispose()) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(panic) => Some(format!("dispose panicked: {panic}")),
            };
            if let Some(message) = failure {
                fail(host, report, id.clone(), FailureStage::Dispose, &message);
            } else {
                info!(extension = %id, "Extension unloaded");
            }
            drop(module);
            host.release(&id);
            report.disposed.push(id);
        }

        self.settle();
    }
}

fn fail<X: ExtensionHost>(
    host: &X,
    report: &mut LoadReport,
    subject: String,
    stage: FailureStage,
    message: &str,
) {
    error!(extension = %subject, %stage, error = %message, "Extension failure");
    host.report(&format!("Extension {subject} failed to {stage}. Check the log for details."));
    report.failures.push(ExtensionFailure { subject, stage, message: message.to_owned() });
}
