use harbor_derive::harbor_error;
use std::borrow::Cow;

#[harbor_error]
pub enum StoreError {
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Document is invalid{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read(path: &str) -> Result<String, StoreError> {
    std::fs::read_to_string(path).context("Reading configuration document")
}

fn validate(raw: &str) -> Result<(), StoreError> {
    if raw.is_empty() {
        return Err(StoreError::Invalid { message: "empty document".into(), context: None })
            .context("Validating configuration document");
    }
    Ok(())
}

fn main() {
    let err = read("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("(Reading configuration document)"));

    let err = validate("").unwrap_err();
    assert!(err.to_string().starts_with("Document is invalid (Validating"));

    let err: StoreError = "boom".into();
    assert_eq!(err.to_string(), "Internal store error: boom");
}
