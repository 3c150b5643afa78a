//! Error types for pagination setup.
//!
//! Pagination itself never fails on cursor problems: malformed tokens degrade
//! to the first page. Errors raised by the data source are surfaced through the
//! source's own error type. This module only covers invalid engine setup.

use std::borrow::Cow;

/// Error type for engine configuration and setup.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum Error {
    /// Configuration error.
    ///
    /// Raised when limits are out of range or otherwise inconsistent.
    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),
}

impl Error {
    /// Creates a configuration error with the given message.
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(message.into())
    }
}

/// Specialized [`Result`] type for engine setup.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;
