//! The panic-reporting hook.
//!
//! A resolver panic is caught at the field boundary and converted into a
//! field-level null plus an error; the [`PanicLogger`] is invoked once per
//! caught panic so the host application can report it out-of-band. Logging
//! never suppresses the field error.

use std::any::Any;

/// Receives every panic payload recovered from a resolver call.
pub trait PanicLogger: Send + Sync {
    /// `context` names the failing resolver, e.g. `Query.user`.
    fn log_panic(&self, context: &str, payload: &(dyn Any + Send));
}

/// Reports recovered panics through `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPanicLogger;

impl PanicLogger for DefaultPanicLogger {
    fn log_panic(&self, context: &str, payload: &(dyn Any + Send)) {
        tracing::error!(
            context,
            panic = panic_message(payload),
            "panic recovered from resolver",
        );
    }
}

/// Best-effort extraction of the panic message. `panic!` payloads are
/// `&str` or `String` in practice; anything else is opaque.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
