use harbor::kernel::output::OutputChannel;
use std::io::Write;

/// Prints messages to stdout and errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OutputChannel for ConsoleOutput {
    fn print(&self, message: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{message}");
    }

    fn print_error(&self, message: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}
