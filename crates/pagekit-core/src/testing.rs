//! Recording [`Queryable`] used by the engine's unit tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::query::{Queryable, RangeFilter};
use crate::sorting::SortOrder;

#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("source unavailable")]
    Unavailable,
}

/// Everything the engine asked the source to do.
#[derive(Debug, Default)]
pub struct Calls {
    pub filters: Vec<RangeFilter>,
    pub orders: Vec<(String, SortOrder)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub counted: bool,
}

/// Returns canned rows (cut to the requested limit) and records calls.
pub struct RecordingSource {
    rows: Vec<Value>,
    total: Option<u64>,
    fail_count: bool,
    fail_execute: bool,
    calls: Arc<Mutex<Calls>>,
}

impl RecordingSource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            total: Some(rows.len() as u64),
            rows,
            fail_count: false,
            fail_execute: false,
            calls: Arc::default(),
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn without_count(mut self) -> Self {
        self.total = None;
        self
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Calls>> {
        self.calls.clone()
    }

    fn record(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }
}

impl Queryable for RecordingSource {
    type Error = TestError;
    type Item = Value;

    fn set_filter(&mut self, filter: RangeFilter) {
        self.record(|calls| calls.filters.push(filter));
    }

    fn set_order(&mut self, field: &str, order: SortOrder) {
        self.record(|calls| calls.orders = vec![(field.to_owned(), order)]);
    }

    fn add_order(&mut self, field: &str, order: SortOrder) {
        self.record(|calls| calls.orders.push((field.to_owned(), order)));
    }

    fn set_limit(&mut self, limit: u64) {
        self.record(|calls| calls.limit = Some(limit));
    }

    fn set_offset(&mut self, offset: u64) {
        self.record(|calls| calls.offset = Some(offset));
    }

    async fn execute(self) -> Result<Vec<Value>, TestError> {
        if self.fail_execute {
            return Err(TestError::Unavailable);
        }

        let limit = self.calls.lock().unwrap().limit;
        let mut rows = self.rows;
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }

        Ok(rows)
    }

    async fn count(&mut self) -> Result<Option<u64>, TestError> {
        self.record(|calls| calls.counted = true);
        if self.fail_count {
            return Err(TestError::Unavailable);
        }

        Ok(self.total)
    }
}
