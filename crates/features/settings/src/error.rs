use harbor_commands::CommandError;
use std::borrow::Cow;

#[harbor_derive::harbor_error]
pub enum SettingsError {
    /// The document could not be read from disk.
    #[error("Failed to load configuration document{}: {message}", format_context(.context))]
    Load { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Configuration document is malformed{}: {source}", format_context(.context))]
    Malformed { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Writing the document back failed. The in-memory document keeps the change.
    #[error("Failed to persist configuration document{}: {source}", format_context(.context))]
    Persist { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Name lookup failed{}: {source}", format_context(.context))]
    Lookup { source: harbor_kernel::lookup::LookupError, context: Option<Cow<'static, str>> },

    #[error("Internal settings error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        Self::handler(err)
    }
}
