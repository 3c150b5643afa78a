//! Per-call pagination parameters.

use derive_builder::Builder;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sorting::SortBy;

/// Maximum number of items per page.
pub const MAX_LIMIT: u64 = 100;

/// Number of items per page when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: u64 = 20;

/// Field used to break ties between rows with equal sort values.
pub const DEFAULT_TIE_BREAKER: &str = "id";

/// Immutable configuration of a single pagination call.
///
/// A context selects between keyset mode (the default), driven by an opaque
/// `cursor`, and offset mode, enabled with `use_offset_fallback`, driven by
/// `offset`. The requested `limit` is kept as given and clamped on read.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[builder(
    name = "QueryContextBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "build_inner", error = "QueryContextError")
)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    /// Primary sort field and direction.
    pub sort: SortBy,
    /// Requested page size.
    #[builder(default)]
    #[serde(default)]
    pub limit: Option<u64>,
    /// Opaque cursor of the last row of the previous page.
    #[builder(default)]
    #[serde(default)]
    pub cursor: Option<String>,
    /// Number of rows to skip in offset mode.
    #[builder(default)]
    #[serde(default)]
    pub offset: Option<u64>,
    /// Whether to use offset pagination instead of cursors.
    #[builder(default)]
    #[serde(default)]
    pub use_offset_fallback: bool,
    /// Secondary ordering that makes the overall order total.
    #[builder(default = "SortBy::asc(DEFAULT_TIE_BREAKER)")]
    #[serde(default = "default_tie_breaker")]
    pub tie_breaker: SortBy,
    /// Whether to consult the source's count; falls back to the paginator's
    /// configuration when unset.
    #[builder(default)]
    #[serde(default)]
    pub include_count: Option<bool>,
}

fn default_tie_breaker() -> SortBy {
    SortBy::asc(DEFAULT_TIE_BREAKER)
}

/// Error type for QueryContext builder.
pub type QueryContextError = derive_builder::UninitializedFieldError;

impl QueryContextBuilder {
    /// Build the context.
    pub fn build(self) -> Result<QueryContext, QueryContextError> {
        self.build_inner()
    }
}

impl QueryContext {
    /// Creates a keyset context sorted by `sort` with default settings.
    pub fn new(sort: SortBy) -> Self {
        Self {
            sort,
            limit: None,
            cursor: None,
            offset: None,
            use_offset_fallback: false,
            tie_breaker: default_tie_breaker(),
            include_count: None,
        }
    }

    /// Create a builder for this context.
    pub fn builder() -> QueryContextBuilder {
        QueryContextBuilder::default()
    }

    /// Returns a context with the given requested limit.
    #[inline]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns a context continuing after the given cursor token.
    #[inline]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Returns a context in offset mode starting at `offset`.
    #[inline]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self.use_offset_fallback = true;
        self
    }

    /// Returns a context with the given tie-breaker ordering.
    #[inline]
    pub fn with_tie_breaker(mut self, tie_breaker: SortBy) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Returns a context that skips or forces the count query.
    #[inline]
    pub fn with_count(mut self, include_count: bool) -> Self {
        self.include_count = Some(include_count);
        self
    }

    /// Returns the page size clamped to `1..=MAX_LIMIT`, defaulting to
    /// [`DEFAULT_LIMIT`].
    pub fn limit(&self) -> u64 {
        self.limit_within(DEFAULT_LIMIT, MAX_LIMIT)
    }

    /// Returns the page size using the given default and upper bound.
    pub(crate) fn limit_within(&self, default_limit: u64, max_limit: u64) -> u64 {
        let max_limit = max_limit.clamp(1, MAX_LIMIT);
        self.limit.unwrap_or(default_limit).clamp(1, max_limit)
    }

    /// Returns the number of rows to skip in offset mode.
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Checks whether a cursor token was supplied.
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }
}
