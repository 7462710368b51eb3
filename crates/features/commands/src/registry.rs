use crate::error::CommandError;
use fxhash::FxHashMap;
use harbor_kernel::output::OutputChannel;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;
use tracing::debug;

/// One dispatched command line, as seen by a handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The registered name that matched, e.g. `/xlmute`.
    pub command: String,
    /// Everything after the command token, leading whitespace trimmed.
    pub args: String,
    output: Arc<dyn OutputChannel>,
}

impl Invocation {
    pub fn new(
        command: impl Into<String>,
        args: impl Into<String>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        Self { command: command.into(), args: args.into(), output }
    }

    /// First argument word and the trimmed remainder, e.g. `("add", "Ifrit")`.
    #[must_use]
    pub fn subcommand(&self) -> (&str, &str) {
        let args = self.args.trim();
        args.split_once(char::is_whitespace)
            .map_or((args, ""), |(head, rest)| (head, rest.trim()))
    }

    pub fn print(&self, message: &str) {
        self.output.print(message);
    }

    pub fn print_error(&self, message: &str) {
        self.output.print_error(message);
    }

    /// The channel, for handlers that report from a background task.
    #[must_use]
    pub fn output(&self) -> Arc<dyn OutputChannel> {
        Arc::clone(&self.output)
    }
}

pub type CommandHandler = Arc<dyn Fn(&Invocation) -> Result<(), CommandError> + Send + Sync>;

/// Who registered a command. Extension-owned commands go away with their extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandOwner {
    Host,
    Extension(String),
}

impl Display for CommandOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Extension(id) => write!(f, "extension:{id}"),
        }
    }
}

#[derive(Clone)]
pub struct CommandEntry {
    pub name: String,
    pub handler: CommandHandler,
    pub help: String,
    pub visible: bool,
    pub owner: CommandOwner,
}

impl Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("visible", &self.visible)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Entries {
    ordered: Vec<CommandEntry>,
    index: FxHashMap<String, usize>,
}

impl Entries {
    fn reindex(&mut self) {
        self.index =
            self.ordered.iter().enumerate().map(|(i, entry)| (entry.name.clone(), i)).collect();
    }
}

/// Named commands in registration order.
///
/// Names are unique and case-sensitive, prefix included. Handlers run with the
/// lock released, so a handler may register or remove commands itself.
#[derive(Default)]
pub struct CommandRegistry {
    entries: RwLock<Entries>,
}

impl Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry").field("len", &self.len()).finish()
    }
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host-owned command.
    ///
    /// # Errors
    /// [`CommandError::Duplicate`] when `name` is taken,
    /// [`CommandError::InvalidName`] when it is blank or contains whitespace.
    pub fn register<F>(
        &self,
        name: impl Into<String>,
        handler: F,
        help: impl Into<String>,
        visible: bool,
    ) -> Result<(), CommandError>
    where
        F: Fn(&Invocation) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.register_owned(name, handler, help, visible, CommandOwner::Host)
    }

    /// Registers a command on behalf of `owner`.
    ///
    /// # Errors
    /// Same as [`CommandRegistry::register`].
    pub fn register_owned<F>(
        &self,
        name: impl Into<String>,
        handler: F,
        help: impl Into<String>,
        visible: bool,
        owner: CommandOwner,
    ) -> Result<(), CommandError>
    where
        F: Fn(&Invocation) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        let name = name.into();
        validate_name(&name)?;

        let mut entries = self.entries.write();
        if entries.index.contains_key(&name) {
            return Err(CommandError::Duplicate { name: Cow::Owned(name), context: None });
        }

        debug!(command = %name, %owner, visible, "Command registered");
        let position = entries.ordered.len();
        entries.index.insert(name.clone(), position);
        entries.ordered.push(CommandEntry {
            name,
            handler: Arc::new(handler),
            help: help.into(),
            visible,
            owner,
        });
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<CommandEntry> {
        let entries = self.entries.read();
        entries.index.get(name).map(|&i| entries.ordered[i].clone())
    }

    /// Exact match first, otherwise the earliest registered case-insensitive match.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<CommandEntry> {
        let entries = self.entries.read();
        if let Some(&i) = entries.index.get(token) {
            return Some(entries.ordered[i].clone());
        }
        entries.ordered.iter().find(|entry| entry.name.eq_ignore_ascii_case(token)).cloned()
    }

    /// Entries in registration order; hidden ones only with `include_hidden`.
    #[must_use]
    pub fn list_visible(&self, include_hidden: bool) -> Vec<CommandEntry> {
        self.entries
            .read()
            .ordered
            .iter()
            .filter(|entry| include_hidden || entry.visible)
            .cloned()
            .collect()
    }

    /// Names registered by `owner`, in registration order.
    #[must_use]
    pub fn owned_by(&self, owner: &CommandOwner) -> Vec<String> {
        self.entries
            .read()
            .ordered
            .iter()
            .filter(|entry| &entry.owner == owner)
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Drops every command of `owner` and returns how many were removed.
    pub fn remove_owned_by(&self, owner: &CommandOwner) -> usize {
        let mut entries = self.entries.write();
        let before = entries.ordered.len();
        entries.ordered.retain(|entry| &entry.owner != owner);
        let removed = before - entries.ordered.len();
        if removed > 0 {
            entries.reindex();
            debug!(%owner, removed, "Commands removed");
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.ordered.clear();
        entries.index.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_name(name: &str) -> Result<(), CommandError> {
    if name.is_empty() {
        return Err(CommandError::InvalidName { message: "name is empty".into(), context: None });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CommandError::InvalidName {
            message: format!("'{name}' contains whitespace").into(),
            context: None,
        });
    }
    Ok(())
}
