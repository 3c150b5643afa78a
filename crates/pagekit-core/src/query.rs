//! Capability contract the engine requires from a data-access layer.
//!
//! A [`Queryable`] is a single-use query builder already scoped to the
//! caller's dataset (tenant isolation, caller filters). The engine only adds
//! ordering, one range predicate and positional bounds, then executes it.

use std::fmt;
use std::future::Future;

use serde_json::{Map, Value};

use crate::cursor::CursorValue;
use crate::sorting::SortOrder;

/// Strict comparison operator of a [`RangeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `field > value`
    GreaterThan,
    /// `field < value`
    LessThan,
}

impl Comparison {
    /// Returns the SQL operator for this comparison.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }
}

/// Conjunctive range predicate `field <op> value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    /// Field the predicate applies to.
    pub field: String,
    /// Strict comparison operator.
    pub comparison: Comparison,
    /// Boundary value bound as a query parameter.
    pub value: CursorValue,
}

impl RangeFilter {
    /// Creates a new range predicate.
    pub fn new(field: impl Into<String>, comparison: Comparison, value: CursorValue) -> Self {
        Self {
            field: field.into(),
            comparison,
            value,
        }
    }

    /// Predicate selecting rows strictly after `value` in the given order.
    ///
    /// Ascending order selects `field > value`, descending `field < value`.
    pub fn after(field: impl Into<String>, order: SortOrder, value: CursorValue) -> Self {
        let comparison = match order {
            SortOrder::Asc => Comparison::GreaterThan,
            SortOrder::Desc => Comparison::LessThan,
        };

        Self::new(field, comparison, value)
    }

    /// Evaluates the predicate against a field value.
    ///
    /// A missing value never matches, mirroring SQL `NULL` comparisons.
    pub fn matches(&self, value: Option<&CursorValue>) -> bool {
        match (value, self.comparison) {
            (Some(v), Comparison::GreaterThan) => *v > self.value,
            (Some(v), Comparison::LessThan) => *v < self.value,
            (None, _) => false,
        }
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparison.as_sql(), self.value)
    }
}

/// Access to sort-key values of a row.
///
/// The paginator reads the sort field of boundary rows to build cursors.
pub trait Row {
    /// Returns the value of `field`, or `None` when the row has no such field
    /// or the value is not a scalar.
    fn field_value(&self, field: &str) -> Option<CursorValue>;
}

impl<R: Row + ?Sized> Row for &R {
    fn field_value(&self, field: &str) -> Option<CursorValue> {
        (**self).field_value(field)
    }
}

impl Row for Map<String, Value> {
    fn field_value(&self, field: &str) -> Option<CursorValue> {
        self.get(field).and_then(CursorValue::from_json)
    }
}

impl Row for Value {
    fn field_value(&self, field: &str) -> Option<CursorValue> {
        self.as_object().and_then(|object| object.field_value(field))
    }
}

/// Query builder contract consumed by the paginator.
///
/// Implementations are single-use: the engine configures one instance per
/// call and consumes it with [`execute`] or [`execute_with_count`].
///
/// `limit`/`offset` bound raw result rows while `skip`/`take` bound entities;
/// adapters without that distinction can rely on the default `skip`/`take`
/// implementations, which forward to `offset`/`limit`.
///
/// Counting is an optional capability. Sources that cannot count keep the
/// default [`count`] implementation, which reports the capability as absent.
///
/// [`execute`]: Queryable::execute
/// [`execute_with_count`]: Queryable::execute_with_count
/// [`count`]: Queryable::count
pub trait Queryable: Send + Sized {
    /// Row type produced by the query.
    type Item: Row + Send;
    /// Error raised by the underlying data source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Adds a conjunctive range predicate.
    fn set_filter(&mut self, filter: RangeFilter);

    /// Sets the primary ordering, replacing any previous ordering.
    fn set_order(&mut self, field: &str, order: SortOrder);

    /// Appends a secondary ordering after the existing ones.
    fn add_order(&mut self, field: &str, order: SortOrder);

    /// Limits the number of rows returned.
    fn set_limit(&mut self, limit: u64);

    /// Skips the given number of rows.
    fn set_offset(&mut self, offset: u64);

    /// Skips the given number of entities.
    fn set_skip(&mut self, skip: u64) {
        self.set_offset(skip);
    }

    /// Limits the number of entities returned.
    fn set_take(&mut self, take: u64) {
        self.set_limit(take);
    }

    /// Executes the query and returns rows in query order.
    fn execute(self) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;

    /// Counts rows matching the filters, ignoring positional bounds.
    ///
    /// Returns `Ok(None)` when the source cannot count.
    fn count(&mut self) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send {
        async { Ok(None) }
    }

    /// Executes the query and counts matching rows.
    ///
    /// The default implementation issues [`count`] followed by [`execute`];
    /// sources able to do both in one round trip should override it.
    ///
    /// [`count`]: Queryable::count
    /// [`execute`]: Queryable::execute
    fn execute_with_count(
        mut self,
    ) -> impl Future<Output = Result<(Vec<Self::Item>, Option<u64>), Self::Error>> + Send {
        async move {
            let total = self.count().await?;
            let items = self.execute().await?;
            Ok((items, total))
        }
    }
}
