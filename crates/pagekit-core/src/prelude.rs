//! Prelude module for pagekit-core.
//!
//! This module re-exports the most commonly used types and traits, making it
//! easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust
//! use pagekit_core::prelude::*;
//!
//! let ctx = QueryContext::new(SortBy::desc("created_at")).with_limit(25);
//! assert_eq!(ctx.limit(), 25);
//! ```

// Engine and configuration
pub use crate::{Paginator, PaginatorConfig, offset_paginate};

// Request and result shapes
pub use crate::{Page, PageWithTotals, QueryContext, SortBy, SortOrder};

// Cursor codec
pub use crate::{Cursor, CursorValue};

// Data source contract
pub use crate::{Queryable, RangeFilter, Row};

// Error types
pub use crate::Error;
