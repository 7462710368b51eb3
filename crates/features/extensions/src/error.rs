use std::borrow::Cow;

#[harbor_derive::harbor_error]
pub enum ExtensionError {
    /// Another load, unload or reload is in progress.
    #[error("Extension lifecycle is busy{}", format_context(.context))]
    Busy { context: Option<Cow<'static, str>> },

    #[error("Invalid extension manifest{}: {message}", format_context(.context))]
    InvalidManifest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Extension manifest I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Extension manifest is not valid JSON{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Extension directory scan failed{}: {source}", format_context(.context))]
    Discovery { source: walkdir::Error, context: Option<Cow<'static, str>> },

    /// A factory is already registered for this entry point.
    #[error("Duplicate extension entry point{}: {message}", format_context(.context))]
    DuplicateEntry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown extension entry point{}: {message}", format_context(.context))]
    UnknownEntry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The module itself failed or panicked.
    #[error("Extension module failed{}: {message}", format_context(.context))]
    Module { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
