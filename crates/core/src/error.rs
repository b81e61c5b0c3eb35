//! Error types shared across the workspace
//!
//! Conflicts are NOT errors here. A revision mismatch is an expected,
//! recoverable outcome and is reported through the store's `WriteOutcome`
//! value; this enum covers programmer errors (missing reserved fields) and
//! backend/codec failures that surface to the caller.

use thiserror::Error;

/// Result alias used throughout flowstore.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for flowstore operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A write was attempted on a document lacking a reserved field.
    /// Raised immediately; never retried.
    #[error("document is missing required field `{0}`")]
    MissingField(&'static str),

    /// A document root was not a mapping.
    #[error("expected a mapping at the document root, got {0}")]
    NotADocument(&'static str),

    /// The underlying driver reported a failure. Not retried by this layer;
    /// `put`'s physical-save step downgrades these to conflicts instead.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Wrap a driver failure message.
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend(message.into())
    }
}
