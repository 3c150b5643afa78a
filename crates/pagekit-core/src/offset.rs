//! Page-number pagination with totals.
//!
//! Offset pagination supports jumping to arbitrary pages and reporting a page
//! count. It is unstable under concurrent inserts and deletes, and deep pages
//! make the store scan and discard every skipped row; prefer keyset
//! pagination through [`Paginator::paginate`] where page numbers are not
//! needed.
//!
//! [`Paginator::paginate`]: crate::Paginator::paginate

use crate::context::MAX_LIMIT;
use crate::page::PageWithTotals;
use crate::query::Queryable;
use crate::TRACING_TARGET_PAGINATOR;

/// Returns page `page` (1-based) of `source` together with totals.
///
/// `page` is raised to at least 1 and `limit` clamped to `1..=MAX_LIMIT`.
/// Items and the total are fetched with [`Queryable::execute_with_count`].
/// When the source cannot count, the total falls back to the number of rows
/// known to exist (`offset + items.len()`).
pub async fn offset_paginate<Q>(
    source: Q,
    page: u64,
    limit: u64,
) -> Result<PageWithTotals<Q::Item>, Q::Error>
where
    Q: Queryable,
{
    paginate_pages(source, page, limit, MAX_LIMIT).await
}

pub(crate) async fn paginate_pages<Q>(
    mut source: Q,
    page: u64,
    limit: u64,
    max_limit: u64,
) -> Result<PageWithTotals<Q::Item>, Q::Error>
where
    Q: Queryable,
{
    let page = page.max(1);
    let limit = limit.clamp(1, max_limit.clamp(1, MAX_LIMIT));
    let offset = (page - 1).saturating_mul(limit);

    source.set_skip(offset);
    source.set_take(limit);

    let (items, total) = source.execute_with_count().await?;
    let total = total.unwrap_or_else(|| {
        let known = offset + items.len() as u64;
        tracing::warn!(
            target: TRACING_TARGET_PAGINATOR,
            known,
            "source cannot count, reporting known rows as the total"
        );
        known
    });

    let page = PageWithTotals::new(items, total, page, limit);

    tracing::debug!(
        target: TRACING_TARGET_PAGINATOR,
        page = page.page,
        limit = page.limit,
        offset,
        total = page.total,
        total_pages = page.total_pages,
        "assembled numbered page"
    );

    Ok(page)
}
