use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use typed_builder::TypedBuilder;

/// How a child process should be started. Pure data: creating the process is
/// the job of an external broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct LaunchConfig {
    #[builder(setter(into))]
    pub executable: PathBuf,
    #[builder(default, setter(into))]
    pub arguments: Vec<String>,
    /// Platform process-creation flags, passed through verbatim.
    #[builder(default)]
    pub creation_flags: u32,
    #[builder(default, setter(strip_option, into))]
    pub working_directory: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::new(),
            arguments: Vec::new(),
            creation_flags: 0,
            working_directory: None,
        }
    }
}

impl LaunchConfig {
    /// The argument list joined into a single command line.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.arguments.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
