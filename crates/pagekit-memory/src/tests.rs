//! End-to-end pagination over in-memory stores.

use std::collections::HashSet;

use jiff::Timestamp;
use pagekit_core::{
    Cursor, CursorValue, MAX_LIMIT, Paginator, QueryContext, Queryable, Row, SortBy, SortOrder,
    offset_paginate,
};
use serde_json::json;

use crate::{MemoryError, MemoryStore, Operation};

#[derive(Debug, Clone, PartialEq)]
struct Event {
    id: i64,
    created_at: Timestamp,
    score: i64,
}

impl Row for Event {
    fn field_value(&self, field: &str) -> Option<CursorValue> {
        match field {
            "id" => Some(self.id.into()),
            "created_at" => Some(self.created_at.into()),
            "score" => Some(self.score.into()),
            _ => None,
        }
    }
}

fn ts(s: &str) -> Timestamp {
    s.parse().unwrap()
}

/// Events with ids `1..=n` and scores cycling through `0..5`.
fn events(n: i64) -> MemoryStore<Event> {
    (1..=n)
        .map(|id| Event {
            id,
            created_at: Timestamp::from_second(1_700_000_000 + id).unwrap(),
            score: id % 5,
        })
        .collect()
}

fn ids(items: &[Event]) -> Vec<i64> {
    items.iter().map(|event| event.id).collect()
}

#[tokio::test]
async fn page_never_exceeds_clamped_limit() {
    let store = events(150);
    let paginator = Paginator::default().without_logging();

    for limit in 1..=1000 {
        let ctx = QueryContext::new(SortBy::asc("id")).with_limit(limit);
        let page = paginator.paginate(store.query(), &ctx).await.unwrap();
        assert_eq!(page.items.len() as u64, limit.min(MAX_LIMIT));
    }
}

#[tokio::test]
async fn ascending_cursor_is_strict() {
    let store = events(40);
    let boundary = CursorValue::Int(2);
    let ctx = QueryContext::new(SortBy::asc("score"))
        .with_limit(100)
        .with_cursor(Cursor::new("score", boundary.clone()).encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 16);
    assert!(
        page.items
            .iter()
            .all(|event| CursorValue::Int(event.score) > boundary)
    );
    assert!(page.has_previous_page);
}

#[tokio::test]
async fn descending_cursor_is_strict() {
    let store = events(40);
    let boundary = CursorValue::Int(2);
    let ctx = QueryContext::new(SortBy::desc("score"))
        .with_cursor(Cursor::new("score", boundary.clone()).encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 16);
    assert!(
        page.items
            .iter()
            .all(|event| CursorValue::Int(event.score) < boundary)
    );
    // Equal scores keep their tie-breaker order.
    assert_eq!(ids(&page.items[..8]), vec![1, 6, 11, 16, 21, 26, 31, 36]);
}

#[tokio::test]
async fn tie_breaker_orders_equal_sort_values() {
    let store = events(20);
    let ctx = QueryContext::new(SortBy::asc("score")).with_limit(4);

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert_eq!(ids(&page.items), vec![5, 10, 15, 20]);
    assert!(page.has_next_page);
}

#[tokio::test]
async fn empty_store_yields_empty_page() {
    let store = MemoryStore::<Event>::new(Vec::new());
    let ctx = QueryContext::new(SortBy::asc("created_at"));

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(!page.has_next_page);
    assert!(!page.has_previous_page);
    assert_eq!(page.total_count, Some(0));
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn malformed_cursor_matches_first_page() {
    let store = events(30);
    let paginator = Paginator::default();
    let ctx = QueryContext::new(SortBy::desc("created_at")).with_limit(7);

    let first = paginator.paginate(store.query(), &ctx).await.unwrap();
    let degraded = paginator
        .paginate(store.query(), &ctx.clone().with_cursor("definitely-not-a-cursor"))
        .await
        .unwrap();

    assert_eq!(degraded.items, first.items);
    assert!(!degraded.has_previous_page);
    assert!(degraded.previous_cursor.is_none());
    assert_eq!(degraded.next_cursor, first.next_cursor);
}

#[tokio::test]
async fn dated_rows_after_first_day() {
    let store: MemoryStore<Event> = ["2023-01-01", "2023-01-02", "2023-01-03"]
        .into_iter()
        .zip(1..)
        .map(|(day, id)| Event {
            id,
            created_at: ts(&format!("{day}T00:00:00Z")),
            score: 0,
        })
        .collect();

    let ctx = QueryContext::new(SortBy::asc("created_at"))
        .with_limit(10)
        .with_cursor(Cursor::new("created_at", ts("2023-01-01T00:00:00Z")).encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert_eq!(ids(&page.items), vec![2, 3]);
    assert!(!page.has_next_page);
    assert!(page.has_previous_page);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn dated_json_rows_after_first_day() {
    let store = MemoryStore::from_json(json!([
        {"id": 1, "created_at": "2023-01-01"},
        {"id": 2, "created_at": "2023-01-02"},
        {"id": 3, "created_at": "2023-01-03"},
    ]))
    .unwrap();

    let cursor = Cursor::new("created_at", jiff::civil::date(2023, 1, 1));
    let ctx = QueryContext::new(SortBy::asc("created_at"))
        .with_limit(10)
        .with_cursor(cursor.encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    let days: Vec<_> = page
        .items
        .iter()
        .map(|row| row["created_at"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2023-01-02", "2023-01-03"]);
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn string_cursor_matches_dated_json_rows() {
    let store = MemoryStore::from_json(json!([
        {"id": 1, "created_at": "2023-01-01"},
        {"id": 2, "created_at": "2023-01-02"},
        {"id": 3, "created_at": "2023-01-03"},
    ]))
    .unwrap();

    let ctx = QueryContext::new(SortBy::asc("created_at"))
        .with_limit(10)
        .with_cursor(Cursor::new("created_at", "2023-01-01").encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    let days: Vec<_> = page
        .items
        .iter()
        .map(|row| row["created_at"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2023-01-02", "2023-01-03"]);
}

#[tokio::test]
async fn walking_offsetless_datetimes_keeps_same_day_rows() {
    let store = MemoryStore::from_json(json!([
        {"id": 1, "created_at": "2023-01-01T10:00:00"},
        {"id": 2, "created_at": "2023-01-01T12:00:00"},
        {"id": 3, "created_at": "2023-01-02T09:00:00"},
    ]))
    .unwrap();

    let paginator = Paginator::default();
    let base = QueryContext::new(SortBy::asc("created_at")).with_limit(1);

    let mut seen = Vec::new();
    let mut ctx = base.clone();
    loop {
        let page = paginator.paginate(store.query(), &ctx).await.unwrap();
        seen.extend(page.items.iter().map(|row| row["id"].as_i64().unwrap()));

        match page.next_cursor {
            Some(next) => ctx = base.clone().with_cursor(next),
            None => break,
        }
    }

    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test]
async fn float_cursor_keeps_larger_integers() {
    let two_53 = 9_007_199_254_740_992_i64;
    let store = MemoryStore::from_json(json!([
        {"id": 1, "n": two_53},
        {"id": 2, "n": two_53 + 1},
    ]))
    .unwrap();

    let ctx = QueryContext::new(SortBy::asc("n"))
        .with_cursor(Cursor::new("n", two_53 as f64).encode());

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    let ids: Vec<_> = page
        .items
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn walking_cursors_visits_every_row_once() {
    let store = events(53);
    let paginator = Paginator::default();
    let base = QueryContext::new(SortBy::desc("created_at")).with_limit(10);

    let mut seen = Vec::new();
    let mut ctx = base.clone();
    let mut pages = 0;
    loop {
        let page = paginator.paginate(store.query(), &ctx).await.unwrap();
        pages += 1;
        assert_eq!(page.has_previous_page, pages > 1);
        seen.extend(ids(&page.items));

        match page.next_cursor {
            Some(next) => ctx = base.clone().with_cursor(next),
            None => {
                assert!(!page.has_next_page);
                break;
            }
        }
    }

    assert_eq!(pages, 6);
    assert_eq!(seen, (1..=53).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn inserts_before_boundary_do_not_duplicate() {
    let mut rows: Vec<Event> = (10..20)
        .map(|id| Event {
            id,
            created_at: Timestamp::from_second(id).unwrap(),
            score: 0,
        })
        .collect();

    let paginator = Paginator::default();
    let base = QueryContext::new(SortBy::asc("created_at")).with_limit(4);

    let first = paginator
        .paginate(MemoryStore::new(rows.clone()).query(), &base)
        .await
        .unwrap();

    // A row lands before the boundary between the two requests.
    rows.push(Event {
        id: 1,
        created_at: Timestamp::from_second(1).unwrap(),
        score: 0,
    });

    let next = first.next_cursor.clone().unwrap();
    let second = paginator
        .paginate(MemoryStore::new(rows).query(), &base.with_cursor(next))
        .await
        .unwrap();

    let first_ids: HashSet<_> = ids(&first.items).into_iter().collect();
    assert!(ids(&second.items).iter().all(|id| !first_ids.contains(id)));
    assert_eq!(ids(&second.items), vec![14, 15, 16, 17]);
}

#[tokio::test]
async fn absent_count_relies_on_overfetch() {
    let store = events(12);
    let ctx = QueryContext::new(SortBy::asc("id")).with_limit(5);

    let page = Paginator::default()
        .paginate(store.query().without_count(), &ctx)
        .await
        .unwrap();

    assert!(page.has_next_page);
    assert_eq!(page.total_count, None);
    assert_eq!(ids(&page.items), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn count_failure_still_returns_page() {
    let store = events(3);
    let ctx = QueryContext::new(SortBy::asc("id"));

    let page = Paginator::default()
        .paginate(store.query().failing(Operation::Count), &ctx)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_count, None);
}

#[tokio::test]
async fn source_failure_propagates_unchanged() {
    let store = events(3);
    let ctx = QueryContext::new(SortBy::asc("id"));

    let result = Paginator::default()
        .paginate(store.query().failing(Operation::Execute), &ctx)
        .await;

    assert!(matches!(
        result,
        Err(MemoryError::Injected(Operation::Execute))
    ));
}

#[tokio::test]
async fn offset_fallback_page() {
    let store = events(11);
    let ctx = QueryContext::new(SortBy::asc("id"))
        .with_limit(5)
        .with_offset(10);

    let page = Paginator::default()
        .paginate(store.query(), &ctx)
        .await
        .unwrap();

    assert_eq!(ids(&page.items), vec![11]);
    assert!(!page.has_next_page);
    assert!(page.has_previous_page);
    assert!(page.next_cursor.is_none());
    assert_eq!(page.total_count, Some(11));
}

#[tokio::test]
async fn numbered_pages_of_eleven_rows() {
    let store = events(11);

    let mut query = store.query();
    query.set_order("id", SortOrder::Asc);
    let page = offset_paginate(query, 2, 5).await.unwrap();

    assert_eq!(ids(&page.items), vec![6, 7, 8, 9, 10]);
    assert_eq!(page.total, 11);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next_page());

    let mut query = store.query();
    query.set_order("id", SortOrder::Asc);
    let last = Paginator::default()
        .offset_paginate(query, 3, 5)
        .await
        .unwrap();
    assert_eq!(ids(&last.items), vec![11]);
    assert!(!last.has_next_page());
}
