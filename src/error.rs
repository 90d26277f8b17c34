//! Unified error type.

use thiserror::Error;

/// The error type returned by controller registration.
///
/// Application-level failures (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values at request time, not as `Error`s.
/// This type only surfaces wiring failures: a handler value that cannot be
/// normalized, a router the active registrar cannot bind to, or a route the
/// router refuses.
#[derive(Debug, Error)]
pub enum Error {
    /// The handler value is neither a canonical handler nor a writer function.
    #[error("failed to map handler of type `{type_name}`")]
    HandlerMapping { type_name: &'static str },

    /// The router is not the type the active registrar binds to.
    #[error("router mismatch: expected `{expected}`, got `{actual}`")]
    RouterMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The router refused the route pattern.
    #[error("invalid route `{pattern}`: {reason}")]
    InvalidRoute { pattern: String, reason: String },

    /// Raised by a custom mapper or registrar.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wraps an arbitrary error raised by a custom mapper or registrar.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Other(err.into())
    }

    pub(crate) fn invalid_route(pattern: &str, reason: impl ToString) -> Self {
        Self::InvalidRoute { pattern: pattern.to_owned(), reason: reason.to_string() }
    }
}
