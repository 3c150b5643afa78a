//! In-memory query builder.

use std::cmp::Ordering;
use std::sync::Arc;

use pagekit_core::{CursorValue, Queryable, RangeFilter, Row, SortBy, SortOrder};

use crate::{MemoryError, MemoryResult, Operation, TRACING_TARGET_SOURCE};

/// Single-use query over a [`MemoryStore`] snapshot.
///
/// Evaluation follows relational semantics: filters are conjunctive, rows
/// missing a filtered field never match, missing sort values order after
/// present ones in ascending order and before them in descending order.
/// `skip`/`take` take precedence over `offset`/`limit` when both are set.
///
/// [`MemoryStore`]: crate::MemoryStore
#[derive(Debug)]
pub struct MemorySource<T> {
    rows: Arc<Vec<T>>,
    filters: Vec<RangeFilter>,
    orders: Vec<SortBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    skip: Option<u64>,
    take: Option<u64>,
    countable: bool,
    failure: Option<Operation>,
}

impl<T> MemorySource<T> {
    pub(crate) fn new(rows: Arc<Vec<T>>) -> Self {
        Self {
            rows,
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            skip: None,
            take: None,
            countable: true,
            failure: None,
        }
    }

    /// Declares the count capability absent.
    pub fn without_count(mut self) -> Self {
        self.countable = false;
        self
    }

    /// Makes the given operation fail with [`MemoryError::Injected`].
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failure = Some(operation);
        self
    }

    fn check(&self, operation: Operation) -> MemoryResult<()> {
        match self.failure {
            Some(failure) if failure == operation => Err(MemoryError::Injected(operation)),
            _ => Ok(()),
        }
    }
}

impl<T: Row> MemorySource<T> {
    fn matching(&self) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|row| {
                self.filters
                    .iter()
                    .all(|filter| filter.matches(row.field_value(&filter.field).as_ref()))
            })
            .collect()
    }

    fn ordered<'a>(&self, rows: Vec<&'a T>) -> Vec<&'a T> {
        if self.orders.is_empty() {
            return rows;
        }

        let mut keyed: Vec<(Vec<Option<CursorValue>>, &'a T)> = rows
            .into_iter()
            .map(|row| {
                let key = self
                    .orders
                    .iter()
                    .map(|sort| row.field_value(&sort.field))
                    .collect();
                (key, row)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &self.orders));
        keyed.into_iter().map(|(_, row)| row).collect()
    }

    fn bounds(&self) -> (usize, Option<usize>) {
        let start = self.skip.or(self.offset).unwrap_or(0);
        let len = self.take.or(self.limit);
        (
            usize::try_from(start).unwrap_or(usize::MAX),
            len.map(|len| usize::try_from(len).unwrap_or(usize::MAX)),
        )
    }
}

impl<T: Row + Clone> MemorySource<T> {
    fn page(&self, matching: Vec<&T>) -> Vec<T> {
        let (start, len) = self.bounds();
        let rows = self.ordered(matching).into_iter().skip(start);
        match len {
            Some(len) => rows.take(len).cloned().collect(),
            None => rows.cloned().collect(),
        }
    }
}

fn compare_keys(a: &[Option<CursorValue>], b: &[Option<CursorValue>], orders: &[SortBy]) -> Ordering {
    a.iter()
        .zip(b)
        .zip(orders)
        .map(|((a, b), sort)| {
            let ordering = match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };

            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl<T> Queryable for MemorySource<T>
where
    T: Row + Clone + Send + Sync + 'static,
{
    type Error = MemoryError;
    type Item = T;

    fn set_filter(&mut self, filter: RangeFilter) {
        self.filters.push(filter);
    }

    fn set_order(&mut self, field: &str, order: SortOrder) {
        self.orders = vec![SortBy::new(field, order)];
    }

    fn add_order(&mut self, field: &str, order: SortOrder) {
        self.orders.push(SortBy::new(field, order));
    }

    fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn set_skip(&mut self, skip: u64) {
        self.skip = Some(skip);
    }

    fn set_take(&mut self, take: u64) {
        self.take = Some(take);
    }

    async fn execute(self) -> MemoryResult<Vec<T>> {
        self.check(Operation::Execute)?;

        let rows = self.page(self.matching());

        tracing::trace!(
            target: TRACING_TARGET_SOURCE,
            filters = self.filters.len(),
            orders = self.orders.len(),
            returned = rows.len(),
            "executed in-memory query"
        );

        Ok(rows)
    }

    async fn count(&mut self) -> MemoryResult<Option<u64>> {
        if !self.countable {
            return Ok(None);
        }
        self.check(Operation::Count)?;

        Ok(Some(self.matching().len() as u64))
    }

    async fn execute_with_count(self) -> MemoryResult<(Vec<T>, Option<u64>)> {
        self.check(Operation::Execute)?;
        if self.countable {
            self.check(Operation::Count)?;
        }

        let matching = self.matching();
        let total = self.countable.then_some(matching.len() as u64);
        let rows = self.page(matching);

        tracing::trace!(
            target: TRACING_TARGET_SOURCE,
            returned = rows.len(),
            total = ?total,
            "executed in-memory query with count"
        );

        Ok((rows, total))
    }
}
