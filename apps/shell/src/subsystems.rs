//! Subsystems the console host ships with.

use harbor::domain::FeatureFlags;
use harbor::{Subsystem, SubsystemResult};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, info};

/// Records facts about the running process once the host starts.
#[derive(Debug, Default)]
pub struct ProcessIntrospection {
    started: Mutex<Option<Instant>>,
}

impl Subsystem for ProcessIntrospection {
    fn name(&self) -> &str {
        "process-introspection"
    }

    fn enable(&self) -> SubsystemResult {
        let executable = std::env::current_exe()?;
        info!(pid = std::process::id(), executable = %executable.display(), "Process inspected");
        *self.started.lock() = Some(Instant::now());
        Ok(())
    }

    fn dispose(&self) -> SubsystemResult {
        if let Some(started) = self.started.lock().take() {
            info!(uptime = ?started.elapsed(), "Process introspection stopped");
        }
        Ok(())
    }
}

/// Publishes presence updates; enabled by the `RichPresence` flag.
#[derive(Debug, Default)]
pub struct RichPresence {
    active: Mutex<bool>,
}

impl RichPresence {
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}

impl Subsystem for RichPresence {
    fn name(&self) -> &str {
        "rich-presence"
    }

    fn required_flag(&self) -> Option<FeatureFlags> {
        Some(FeatureFlags::RICH_PRESENCE)
    }

    fn enable(&self) -> SubsystemResult {
        *self.active.lock() = true;
        debug!("Rich presence enabled");
        Ok(())
    }

    fn dispose(&self) -> SubsystemResult {
        let mut active = self.active.lock();
        if *active {
            *active = false;
            debug!("Rich presence disposed");
        }
        Ok(())
    }
}
