//! Unified error types for the redirect service.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the redirect service.
///
/// Every variant maps onto the HTTP status the API layer answers with:
/// security rejections are 403, validation failures 400, catalog misses
/// 404, and anything infrastructural 500.
#[derive(Debug, Error)]
pub enum Error {
    /// Security rejection: disallowed method or enforced bot traffic.
    #[error("{0}")]
    Rejected(String),

    /// User-facing validation failure on the destination or its parameters.
    #[error("{0}")]
    Validation(String),

    /// Unknown or inactive split test, or an unresolvable destination.
    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Rejected(_) => 403,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}
