use parking_lot::Mutex;
use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug)]
struct Tracked {
    name: Cow<'static, str>,
    handle: JoinHandle<()>,
}

/// Tracker for fire-and-forget tasks spawned off the dispatch path.
///
/// Each task owns its failure: an `Err` returned by the future is logged inside
/// the task and never reaches whoever spawned it. Shutdown either awaits the
/// outstanding tasks ([`BackgroundTasks::drain`]) or aborts them
/// ([`BackgroundTasks::abort_all`]).
#[derive(Debug, Clone)]
pub struct BackgroundTasks {
    runtime: Handle,
    tracked: Arc<Mutex<Vec<Tracked>>>,
}

impl BackgroundTasks {
    /// Creates a tracker that spawns onto `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self { runtime, tracked: Arc::default() }
    }

    /// Creates a tracker bound to the runtime of the calling context, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Spawns `task` without blocking the caller.
    ///
    /// May be called from any thread, inside or outside the runtime.
    pub fn spawn<F, E>(&self, name: impl Into<Cow<'static, str>>, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let handle = self.runtime.spawn(async move {
            match task.await {
                Ok(()) => debug!(task = %task_name, "Background task finished"),
                Err(e) => error!(task = %task_name, error = %e, "Background task failed"),
            }
        });

        let mut tracked = self.tracked.lock();
        tracked.retain(|t| !t.handle.is_finished());
        tracked.push(Tracked { name, handle });
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tracked.lock().iter().filter(|t| !t.handle.is_finished()).count()
    }

    /// Awaits every task spawned so far, including ones spawned while draining.
    pub async fn drain(&self) {
        loop {
            let batch = std::mem::take(&mut *self.tracked.lock());
            if batch.is_empty() {
                return;
            }
            for Tracked { name, handle } in batch {
                if let Err(e) = handle.await
                    && e.is_panic()
                {
                    warn!(task = %name, "Background task panicked");
                }
            }
        }
    }

    /// Aborts every outstanding task and returns how many were still running.
    pub fn abort_all(&self) -> usize {
        let batch = std::mem::take(&mut *self.tracked.lock());
        let mut aborted = 0;
        for Tracked { name, handle } in batch {
            if !handle.is_finished() {
                debug!(task = %name, "Aborting background task");
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }
}
