use std::borrow::Cow;

/// Errors that abort host construction or misuse the orchestrator.
#[harbor_derive::harbor_error]
pub enum HarborError {
    #[error("Command wiring failed{}: {source}", format_context(.context))]
    Command { source: harbor_commands::CommandError, context: Option<Cow<'static, str>> },

    #[error("Extension wiring failed{}: {source}", format_context(.context))]
    Extension { source: harbor_extensions::ExtensionError, context: Option<Cow<'static, str>> },

    #[error("Settings failed{}: {source}", format_context(.context))]
    Settings { source: harbor_settings::SettingsError, context: Option<Cow<'static, str>> },

    #[error("Subsystem failed{}: {message}", format_context(.context))]
    Subsystem { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The orchestrator is not in a state that allows the call.
    #[error("Invalid orchestrator state{}: {message}", format_context(.context))]
    InvalidState { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Async runtime unavailable{}: {message}", format_context(.context))]
    Runtime { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
