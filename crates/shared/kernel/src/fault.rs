//! Fault boundaries around code the host does not control.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Runs `f`, turning a panic into `Err` with the panic message.
///
/// The closure must not leave shared state half-updated on unwind; callers
/// pass only handler or extension code whose state the host discards anyway.
pub fn isolate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Best-effort text of a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolate_passes_values_through() {
        assert_eq!(isolate(|| 41 + 1), Ok(42));
    }

    #[test]
    fn test_isolate_captures_panic_messages() {
        assert_eq!(isolate(|| panic!("static message")), Err::<(), _>("static message".to_owned()));

        let code = 7;
        let err = isolate(|| -> u8 { panic!("formatted {code}") }).unwrap_err();
        assert_eq!(err, "formatted 7");
    }
}
