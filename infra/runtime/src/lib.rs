//! # Runtime
//!
//! Execution plumbing for the Harbor host.
//!
//! * [`RuntimeConfig`] profiles and [`build_runtime_with_config`] create the
//!   Tokio runtime that carries background work spawned by command handlers.
//! * [`BackgroundTasks`] tracks fire-and-forget tasks so shutdown can drain or
//!   abort them.
//! * [`UnloadSignal`] is the one-shot gate between whoever requests an unload
//!   and the thread that owns the host's main loop.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[harbor_runtime::main(host)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

mod signal;
mod tasks;

pub use anyhow::Result;
pub use harbor_derive::main;
pub use signal::UnloadSignal;
pub use tasks::BackgroundTasks;

use anyhow::anyhow;
use std::{thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Worker count used when parallelism cannot be detected.
const DEFAULT_WORKER_THREADS: usize = 4;
/// Worker count of the `host` profile. Handlers only park short lookups here.
const HOST_WORKER_THREADS: usize = 2;
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "harbor-worker";

fn detect_worker_threads() -> usize {
    std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0 && n <= 1024)
        .unwrap_or_else(|| {
            available_parallelism().map(std::num::NonZero::get).unwrap_or(DEFAULT_WORKER_THREADS)
        })
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detect_worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for a runtime living inside a foreign host process.
    ///
    /// The host's own thread drives command dispatch; the runtime only carries
    /// the occasional lookup spawned by a handler, so it stays small.
    #[must_use = "Use this configuration for runtimes embedded in a host process"]
    pub fn host() -> Self {
        Self {
            worker_threads: HOST_WORKER_THREADS,
            stack_size: 2 * 1024 * 1024,
            thread_name: "harbor-host".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    /// Preset for resource-constrained environments.
    #[must_use = "Use this configuration for memory-constrained processes"]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (detect_worker_threads() / 2).max(1),
            stack_size: 2 * 1024 * 1024,
            thread_name: "harbor-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, 1024);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }

    fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(self.thread_name.clone())
    }
}

/// Creates a multithreaded Tokio runtime from `config`.
///
/// Out-of-range values are clamped rather than rejected.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the OS refuses to create the worker threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_are_clamped() {
        assert_eq!(RuntimeConfig::default().with_worker_threads(0).worker_threads, 1);
        assert_eq!(RuntimeConfig::default().with_worker_threads(2000).worker_threads, 1024);
    }

    #[test]
    fn test_stack_size_is_clamped() {
        assert_eq!(RuntimeConfig::default().with_stack_size(100).stack_size, MIN_STACK_SIZE);
        assert_eq!(
            RuntimeConfig::default().with_stack_size(100 * 1024 * 1024).stack_size,
            MAX_STACK_SIZE
        );
    }

    #[test]
    fn test_blank_thread_name_falls_back() {
        let config = RuntimeConfig::host().with_thread_name("   ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_host_profile_builds_and_runs() {
        let runtime = build_runtime_with_config(&RuntimeConfig::host()).unwrap();
        let value = runtime.block_on(async { 21 * 2 });
        assert_eq!(value, 42);
    }

    #[test]
    fn test_normalization_repairs_hand_built_config() {
        let config = RuntimeConfig {
            worker_threads: 0,
            stack_size: 1,
            thread_name: String::new(),
            thread_keep_alive: Duration::from_secs(1),
        };
        let normalized = config.normalized();
        assert_eq!(normalized.worker_threads, 1);
        assert_eq!(normalized.stack_size, MIN_STACK_SIZE);
        assert_eq!(normalized.thread_name, DEFAULT_THREAD_NAME);
    }
}
