use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// The host's user-facing text sink.
///
/// Implementations must be callable from any thread: background tasks report
/// through the same channel as the dispatch path.
pub trait OutputChannel: Debug + Send + Sync {
    fn print(&self, message: &str);

    fn print_error(&self, message: &str);
}

impl<T: OutputChannel + ?Sized> OutputChannel for Arc<T> {
    fn print(&self, message: &str) {
        (**self).print(message);
    }

    fn print_error(&self, message: &str) {
        (**self).print_error(message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Message(String),
    Error(String),
}

impl OutputLine {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Message(text) | Self::Error(text) => text,
        }
    }
}

/// In-memory channel that records every line, for tests and embedders.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    lines: Mutex<Vec<OutputLine>>,
}

impl CapturedOutput {
    #[must_use]
    pub fn lines(&self) -> Vec<OutputLine> {
        self.lines.lock().clone()
    }

    /// Regular messages only.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.collect(|line| matches!(line, OutputLine::Message(_)))
    }

    /// Error lines only.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.collect(|line| matches!(line, OutputLine::Error(_)))
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<OutputLine> {
        std::mem::take(&mut *self.lines.lock())
    }

    fn collect(&self, keep: impl Fn(&OutputLine) -> bool) -> Vec<String> {
        self.lines.lock().iter().filter(|l| keep(l)).map(|l| l.text().to_owned()).collect()
    }
}

impl OutputChannel for CapturedOutput {
    fn print(&self, message: &str) {
        self.lines.lock().push(OutputLine::Message(message.to_owned()));
    }

    fn print_error(&self, message: &str) {
        self.lines.lock().push(OutputLine::Error(message.to_owned()));
    }
}
