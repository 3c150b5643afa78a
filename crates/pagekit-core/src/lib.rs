#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for pagination runs.
///
/// Use this target for logging ordering, cursor handling and page assembly.
pub const TRACING_TARGET_PAGINATOR: &str = "pagekit_core::paginator";

/// Tracing target for cursor encoding and decoding.
pub const TRACING_TARGET_CURSOR: &str = "pagekit_core::cursor";

/// Tracing target for configuration validation.
pub const TRACING_TARGET_CONFIG: &str = "pagekit_core::config";

mod config;
mod context;
mod cursor;
mod error;
mod offset;
mod page;
mod paginator;
pub mod prelude;
mod query;
mod sorting;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::PaginatorConfig;
pub use crate::context::{
    DEFAULT_LIMIT, DEFAULT_TIE_BREAKER, MAX_LIMIT, QueryContext, QueryContextBuilder,
    QueryContextError,
};
pub use crate::cursor::{Cursor, CursorKind, CursorValue};
pub use crate::error::{Error, Result};
pub use crate::offset::offset_paginate;
pub use crate::page::{Page, PageWithTotals};
pub use crate::paginator::Paginator;
pub use crate::query::{Comparison, Queryable, RangeFilter, Row};
pub use crate::sorting::{SortBy, SortOrder};
