use std::borrow::Cow;

/// Errors of the command surface.
#[harbor_derive::harbor_error]
pub enum CommandError {
    /// A command with the exact same name is already registered.
    #[error("Command '{name}' is already registered{}", format_context(.context))]
    Duplicate { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid command name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A handler failed with an error of its own crate.
    #[error("Command handler failed{}: {source}", format_context(.context))]
    Handler { source: Box<dyn std::error::Error + Send + Sync>, context: Option<Cow<'static, str>> },

    /// Internal fallback for handler logic errors.
    #[error("Internal command error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CommandError {
    /// Wraps any error raised inside a handler.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler { source: err.into(), context: None }
    }
}
