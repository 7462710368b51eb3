use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct Gate {
    fired: Mutex<bool>,
    condvar: Condvar,
}

/// A one-shot, thread-safe gate.
///
/// The gate fires at most once and never resets. Any number of threads may
/// wait on it; all of them are released by the single [`UnloadSignal::set`]
/// transition. Clones share the same gate.
#[derive(Debug, Clone, Default)]
pub struct UnloadSignal {
    gate: Arc<Gate>,
}

impl UnloadSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the gate.
    ///
    /// Returns `true` for the call that performed the transition and `false`
    /// for every later call.
    pub fn set(&self) -> bool {
        let mut fired = self.gate.fired.lock();
        if *fired {
            return false;
        }
        *fired = true;
        drop(fired);

        self.gate.condvar.notify_all();
        debug!("Unload signal fired");
        true
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.gate.fired.lock()
    }

    /// Blocks the calling thread until the gate fires. There is no timeout.
    pub fn wait(&self) {
        let mut fired = self.gate.fired.lock();
        while !*fired {
            self.gate.condvar.wait(&mut fired);
        }
    }

    /// Blocks for at most `timeout`; returns whether the gate has fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut fired = self.gate.fired.lock();
        if !*fired {
            let _ = self.gate.condvar.wait_while_for(&mut fired, |fired| !*fired, timeout);
        }
        *fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_only_first_set_transitions() {
        let signal = UnloadSignal::new();
        assert!(!signal.is_set());
        assert!(signal.set());
        assert!(!signal.set());
        assert!(signal.is_set());
    }

    #[test]
    fn test_wait_returns_immediately_once_fired() {
        let signal = UnloadSignal::new();
        signal.set();
        signal.wait();
        assert!(signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_timeout_reports_unfired_gate() {
        let signal = UnloadSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_all_waiters_are_released() {
        let signal = UnloadSignal::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                thread::spawn(move || signal.wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        signal.set();

        for waiter in waiters {
            waiter.join().unwrap();
        }
    }
}
