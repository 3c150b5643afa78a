//! Keyset pagination over a [`Queryable`] source.
//!
//! Keyset mode orders the source by the sort field plus a tie-breaker, turns
//! the cursor into a strict range predicate and overfetches one row to learn
//! whether another page exists. Because the boundary is a value rather than a
//! position, rows inserted before the boundary between two requests never
//! shift later pages.
//!
//! Offset mode is an explicit opt-in for callers that need positional jumps
//! and accept that concurrent inserts or deletes may skip or repeat rows.

use std::future::Future;

use tracing::Dispatch;
use tracing::instrument::WithSubscriber;

use crate::config::PaginatorConfig;
use crate::context::QueryContext;
use crate::cursor::Cursor;
use crate::offset::paginate_pages;
use crate::page::{Page, PageWithTotals};
use crate::query::{Queryable, RangeFilter, Row};
use crate::{Result, TRACING_TARGET_PAGINATOR};

/// Pagination engine.
///
/// A paginator holds only configuration and an optional logger, so it is
/// cheap to clone and safe to share between concurrent calls. Each call owns
/// the source it is given.
///
/// By default the engine logs to whatever subscriber is current for the
/// calling task. [`with_dispatch`] routes its events to a specific subscriber
/// instead, and [`without_logging`] silences them.
///
/// [`with_dispatch`]: Paginator::with_dispatch
/// [`without_logging`]: Paginator::without_logging
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginatorConfig,
    dispatch: Option<Dispatch>,
}

impl Paginator {
    /// Creates a paginator with the given configuration.
    pub fn new(config: PaginatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            dispatch: None,
        })
    }

    /// Returns the paginator configuration.
    #[inline]
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Routes the engine's diagnostics to the given subscriber.
    pub fn with_dispatch(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.dispatch = Some(dispatch.into());
        self
    }

    /// Disables the engine's diagnostics.
    pub fn without_logging(self) -> Self {
        self.with_dispatch(Dispatch::none())
    }

    /// Returns one page of `source` as described by `ctx`.
    ///
    /// Malformed cursors and missing counts never fail the call; errors from
    /// executing the query are returned unchanged.
    pub async fn paginate<Q>(&self, source: Q, ctx: &QueryContext) -> Result<Page<Q::Item>, Q::Error>
    where
        Q: Queryable,
    {
        self.dispatched(self.run(source, ctx)).await
    }

    /// Returns page `page` (1-based) of `source` with page-number totals.
    ///
    /// See [`offset_paginate`] for the clamping rules; the upper bound on
    /// `limit` comes from this paginator's configuration.
    ///
    /// [`offset_paginate`]: crate::offset_paginate
    pub async fn offset_paginate<Q>(
        &self,
        source: Q,
        page: u64,
        limit: u64,
    ) -> Result<PageWithTotals<Q::Item>, Q::Error>
    where
        Q: Queryable,
    {
        self.dispatched(paginate_pages(source, page, limit, self.config.max_limit))
            .await
    }

    async fn dispatched<F: Future>(&self, future: F) -> F::Output {
        match &self.dispatch {
            Some(dispatch) => future.with_subscriber(dispatch.clone()).await,
            None => future.await,
        }
    }

    #[tracing::instrument(
        level = "debug",
        target = TRACING_TARGET_PAGINATOR,
        skip_all,
        fields(
            sort = %ctx.sort,
            tie_breaker = %ctx.tie_breaker,
            has_cursor = ctx.has_cursor()
        )
    )]
    async fn run<Q>(&self, mut source: Q, ctx: &QueryContext) -> Result<Page<Q::Item>, Q::Error>
    where
        Q: Queryable,
    {
        let limit = ctx.limit_within(self.config.default_limit, self.config.max_limit);
        let include_count = ctx.include_count.unwrap_or(self.config.include_count);

        source.set_order(&ctx.sort.field, ctx.sort.order);
        if ctx.tie_breaker.field != ctx.sort.field {
            source.add_order(&ctx.tie_breaker.field, ctx.tie_breaker.order);
        }

        if ctx.use_offset_fallback {
            offset_page(source, ctx.offset(), limit, include_count).await
        } else {
            keyset_page(source, ctx, limit, include_count).await
        }
    }
}

async fn keyset_page<Q>(
    mut source: Q,
    ctx: &QueryContext,
    limit: u64,
    include_count: bool,
) -> Result<Page<Q::Item>, Q::Error>
where
    Q: Queryable,
{
    let sort = &ctx.sort;

    let mut has_previous_page = false;
    if let Some(token) = ctx.cursor.as_deref() {
        match Cursor::decode(token) {
            Some(cursor) => {
                if cursor.field != sort.field {
                    tracing::warn!(
                        target: TRACING_TARGET_PAGINATOR,
                        cursor_field = %cursor.field,
                        sort_field = %sort.field,
                        "cursor was issued for a different sort field"
                    );
                }

                let filter = RangeFilter::after(&sort.field, sort.order, cursor.value);
                tracing::trace!(
                    target: TRACING_TARGET_PAGINATOR,
                    filter = %filter,
                    "applying cursor boundary"
                );

                source.set_filter(filter);
                has_previous_page = true;
            }
            None => {
                tracing::debug!(
                    target: TRACING_TARGET_PAGINATOR,
                    "ignoring malformed cursor, starting from the first page"
                );
            }
        }
    }

    let total = if include_count {
        count_tolerant(&mut source).await
    } else {
        None
    };

    source.set_limit(limit + 1);
    let mut items = source.execute().await?;
    let fetched = items.len();

    // The count is only a hint; some sources cannot honour ordering and
    // limit together, so either signal is enough to report a next page.
    let overfetched = fetched as u64 > limit;
    if overfetched {
        items.truncate(limit as usize);
    }
    let has_next_page = overfetched || total.is_some_and(|total| total > limit);

    let next_cursor = if has_next_page {
        boundary_cursor(&sort.field, items.last())
    } else {
        None
    };
    let previous_cursor = if has_previous_page {
        boundary_cursor(&sort.field, items.first())
    } else {
        None
    };

    tracing::debug!(
        target: TRACING_TARGET_PAGINATOR,
        limit,
        fetched,
        returned = items.len(),
        has_next_page,
        has_previous_page,
        total = ?total,
        "assembled keyset page"
    );

    Ok(Page {
        items,
        has_next_page,
        has_previous_page,
        next_cursor,
        previous_cursor,
        total_count: total,
    })
}

async fn offset_page<Q>(
    mut source: Q,
    offset: u64,
    limit: u64,
    include_count: bool,
) -> Result<Page<Q::Item>, Q::Error>
where
    Q: Queryable,
{
    source.set_skip(offset);
    source.set_take(limit);

    let total = if include_count {
        count_tolerant(&mut source).await
    } else {
        None
    };

    let items = source.execute().await?;
    let has_next_page = total.is_some_and(|total| offset + (items.len() as u64) < total);
    let has_previous_page = offset > 0;

    tracing::debug!(
        target: TRACING_TARGET_PAGINATOR,
        offset,
        limit,
        returned = items.len(),
        has_next_page,
        total = ?total,
        "assembled offset page"
    );

    Ok(Page {
        items,
        has_next_page,
        has_previous_page,
        next_cursor: None,
        previous_cursor: None,
        total_count: total,
    })
}

/// Runs the source's count, treating failures as an absent count.
async fn count_tolerant<Q: Queryable>(source: &mut Q) -> Option<u64> {
    match source.count().await {
        Ok(total) => total,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                error = %error,
                "count query failed, continuing without a total"
            );
            None
        }
    }
}

/// Encodes the sort-field value of `row` as a cursor.
fn boundary_cursor<T: Row>(field: &str, row: Option<&T>) -> Option<String> {
    let value = row?.field_value(field);
    if value.is_none() {
        tracing::warn!(
            target: TRACING_TARGET_PAGINATOR,
            field,
            "boundary row has no value for the sort field, omitting cursor"
        );
    }

    value.map(|value| Cursor::new(field, value).encode())
}
