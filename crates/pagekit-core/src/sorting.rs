//! Sort order and sort specifications.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sort order direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Sort specification: a field name and the order to sort it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SortBy {
    /// The field to sort by.
    pub field: String,
    /// The sort order direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl SortBy {
    /// Creates a new sort specification with the given field and order.
    #[inline]
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Creates a new sort specification with ascending order.
    #[inline]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Creates a new sort specification with descending order.
    #[inline]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// Returns whether the sort order is ascending.
    #[inline]
    pub fn is_asc(&self) -> bool {
        matches!(self.order, SortOrder::Asc)
    }

    /// Returns whether the sort order is descending.
    #[inline]
    pub fn is_desc(&self) -> bool {
        matches!(self.order, SortOrder::Desc)
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}
