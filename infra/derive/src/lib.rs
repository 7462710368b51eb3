#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every Harbor crate.
//!
//! * [`harbor_error`] turns a plain enum into a `thiserror` error with optional
//!   human context attached at the call site.
//! * [`main`] bootstraps an `async fn main` on a profiled Tokio runtime built by
//!   `harbor-runtime`.
//!
//! Examples are `ignore`d here; the consuming crates exercise them.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap the Harbor Tokio runtime.
///
/// Rewrites an `async fn main() -> Result<..>` into a synchronous `main` that
/// builds a runtime from the requested profile and blocks on the body.
///
/// # Arguments
///
/// * `host` - Small fixed worker pool for processes embedded in a host.
/// * `memory_efficient` - Half the detected parallelism, smaller stacks.
/// * `default` (or no argument) - Auto-detected worker count.
///
/// # Examples
///
/// ```rust,ignore
/// #[harbor_runtime::main(host)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a crate error enum with context support.
///
/// Every variant must use named fields. A variant may carry a
/// `context: Option<Cow<'static, str>>` field; variants wrapping another error
/// (a field named `source` or marked `#[source]`/`#[from]`) must carry one.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every wrapped source type.
/// * `From<Source>` for every wrapping variant, so `?` works upstream.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for `#[error(..)]` strings.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[harbor_derive::harbor_error]
/// pub enum StoreError {
///     #[error("I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, StoreError> {
///     std::fs::read_to_string(path).context("Reading configuration document")
/// }
/// ```
#[proc_macro_attribute]
pub fn harbor_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
