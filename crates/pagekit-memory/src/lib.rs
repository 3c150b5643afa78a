#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for in-memory query execution.
pub const TRACING_TARGET_SOURCE: &str = "pagekit_memory::source";

mod error;
mod source;
mod store;

#[cfg(test)]
mod tests;

pub use crate::error::{MemoryError, MemoryResult, Operation};
pub use crate::source::MemorySource;
pub use crate::store::{JsonRow, MemoryStore};
