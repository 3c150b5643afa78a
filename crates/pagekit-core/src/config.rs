//! Paginator configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::context::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::{Error, Result, TRACING_TARGET_CONFIG};

/// Engine-wide pagination defaults.
///
/// Per-call settings in a [`QueryContext`] take precedence; this only fills in
/// what the caller left unset and bounds what it may request.
///
/// [`QueryContext`]: crate::QueryContext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "configurations must be used to create a paginator"]
pub struct PaginatorConfig {
    /// Page size used when a request does not specify one (1-100)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "pagination-default-limit",
            env = "PAGINATION_DEFAULT_LIMIT",
            default_value_t = DEFAULT_LIMIT
        )
    )]
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Upper bound on requested page sizes (1-100)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "pagination-max-limit",
            env = "PAGINATION_MAX_LIMIT",
            default_value_t = MAX_LIMIT
        )
    )]
    #[serde(default = "max_limit")]
    pub max_limit: u64,

    /// Whether to consult the source's count when the request does not say
    #[cfg_attr(
        feature = "config",
        arg(
            long = "pagination-include-count",
            env = "PAGINATION_INCLUDE_COUNT",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "include_count")]
    pub include_count: bool,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn max_limit() -> u64 {
    MAX_LIMIT
}

fn include_count() -> bool {
    true
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            include_count: true,
        }
    }
}

impl PaginatorConfig {
    /// Sets the default page size.
    pub fn with_default_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Sets whether counts are consulted by default.
    pub fn with_count(mut self, include_count: bool) -> Self {
        self.include_count = include_count;
        self
    }

    /// Validates the configuration.
    ///
    /// Requires `1 <= default_limit <= max_limit <= MAX_LIMIT`.
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 || self.max_limit > MAX_LIMIT {
            return Err(Error::config(format!(
                "max_limit must be between 1 and {MAX_LIMIT}, got {}",
                self.max_limit
            )));
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(Error::config(format!(
                "default_limit must be between 1 and max_limit ({}), got {}",
                self.max_limit, self.default_limit
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            default_limit = self.default_limit,
            max_limit = self.max_limit,
            include_count = self.include_count,
            "validated paginator configuration"
        );

        Ok(())
    }
}
