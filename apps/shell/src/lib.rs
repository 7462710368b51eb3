//! # Shell
//!
//! A console front end for the Harbor host. Lines read from stdin are routed
//! as commands; output goes to stdout and errors to stderr. End of input, like
//! `/xlunload`, unloads the host.

mod console;
mod subsystems;

pub use crate::console::ConsoleOutput;
pub use crate::subsystems::{ProcessIntrospection, RichPresence};

use harbor::Orchestrator;
use harbor::domain::config::LoggingSettings;
use harbor_logger::{Logger, LoggerError, parse_level};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Installs logging as configured in the `logging` settings section.
///
/// # Errors
/// See [`harbor_logger::LoggerBuilder::init`].
pub fn init_logging(settings: &LoggingSettings) -> Result<Logger, LoggerError> {
    let builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&settings.level)?)
        .console(settings.console);
    let builder = match &settings.filter {
        Some(filter) => builder.env_filter(filter.as_str()),
        None => builder,
    };

    match &settings.directory {
        Some(directory) => {
            let builder = builder.path(directory).max_files(settings.max_files);
            if settings.json { builder.json().init() } else { builder.init() }
        },
        None => builder.init(),
    }
}

/// Dispatches every line of `input` until it ends or the host is asked to
/// unload. Returns the number of lines dispatched.
pub fn pump_input(host: &Orchestrator, input: impl BufRead) -> usize {
    let signal = host.unload_signal();
    let mut dispatched = 0;

    for line in input.lines() {
        if signal.is_set() {
            break;
        }
        match line {
            Ok(line) => {
                host.dispatch(&line);
                dispatched += 1;
            },
            Err(e) => {
                warn!(error = %e, "Reading input failed");
                break;
            },
        }
    }
    dispatched
}

/// Reads stdin on a dedicated thread. End of input requests an unload.
///
/// # Errors
/// Fails when the thread cannot be spawned.
pub fn spawn_input(host: Arc<Orchestrator>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("harbor-input".to_owned()).spawn(move || {
        let dispatched = pump_input(&host, io::stdin().lock());
        debug!(dispatched, "Input closed");
        host.request_unload();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor::domain::HostSettings;
    use harbor::kernel::output::CapturedOutput;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn host(tmp: &TempDir, output: Arc<CapturedOutput>) -> Orchestrator {
        let mut settings = HostSettings::default();
        settings.document.path = tmp.path().join("harbor.json");
        settings.extensions.primary_dir = tmp.path().join("extensions");
        Orchestrator::builder(settings, output).build().unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pump_dispatches_each_line() {
        let tmp = TempDir::new().unwrap();
        let output = Arc::new(CapturedOutput::default());
        let host = host(&tmp, output.clone());

        let input = Cursor::new("/xlmute spam\n\n/xlmutelist\n");
        assert_eq!(pump_input(&host, input), 3);
        assert_eq!(output.messages(), ["Muted \"spam\".", "\"spam\""]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pump_stops_after_unload() {
        let tmp = TempDir::new().unwrap();
        let output = Arc::new(CapturedOutput::default());
        let host = host(&tmp, output.clone());

        let input = Cursor::new("/xlunload\n/xlmute late\n");
        assert_eq!(pump_input(&host, input), 1);
        assert_eq!(output.messages(), ["Unloading..."]);
    }
}
