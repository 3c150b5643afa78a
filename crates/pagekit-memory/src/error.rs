//! Error types for the in-memory source.

use strum::Display;

/// Source operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    /// [`Queryable::count`](pagekit_core::Queryable::count).
    Count,
    /// [`Queryable::execute`](pagekit_core::Queryable::execute).
    Execute,
}

/// Error type for the in-memory source.
#[derive(Debug, thiserror::Error)]
#[must_use = "source errors should be handled appropriately"]
pub enum MemoryError {
    /// A failure injected with [`MemorySource::failing`].
    ///
    /// Stands in for connectivity or query failures of a real store.
    ///
    /// [`MemorySource::failing`]: crate::MemorySource::failing
    #[error("Injected {0} failure")]
    Injected(Operation),

    /// The input could not be turned into rows.
    #[error("Invalid rows: {0}")]
    InvalidRows(String),

    /// The input was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized [`Result`] type for the in-memory source.
pub type MemoryResult<T, E = MemoryError> = Result<T, E>;
