/// A fatal lexical or syntactic failure.
///
/// Carries only a message. The parse entry points are the sole recovery
/// boundary: they catch this error, attach the lexer's current location, and
/// convert it into a located [`QueryError`](crate::QueryError). A
/// `SyntaxError` must never leak past the parsing boundary.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
