//! Result shapes produced by the paginator.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A page of results.
///
/// This is the single canonical result shape of the engine for both keyset
/// and offset mode. In offset mode the cursor fields are always `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in this page, in query order.
    pub items: Vec<T>,
    /// Whether another page follows this one.
    pub has_next_page: bool,
    /// Whether a page precedes this one.
    pub has_previous_page: bool,
    /// Cursor to fetch the next page. Present only when more items exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Cursor of the first item of this page, present when the page was
    /// reached through a cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
    /// Number of rows matching the query from this page onwards.
    /// Only present when the source was able to count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Creates an empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next_page: false,
            has_previous_page: false,
            next_cursor: None,
            previous_cursor: None,
            total_count: Some(0),
        }
    }

    /// Returns the number of items in this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether this page holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
            next_cursor: self.next_cursor,
            previous_cursor: self.previous_cursor,
            total_count: self.total_count,
        }
    }
}

/// A page of results with page-number totals, produced by offset pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageWithTotals<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of items matching the query (across all pages).
    pub total: u64,
    /// Current page number (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageWithTotals<T> {
    /// Creates a page, deriving the page count from `total` and `limit`.
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        Self {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Returns whether there are more pages after this one.
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns whether there are pages before this one.
    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> PageWithTotals<U>
    where
        F: FnMut(T) -> U,
    {
        PageWithTotals {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
