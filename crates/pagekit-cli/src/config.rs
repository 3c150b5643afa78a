//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── query: QueryArgs            # Input file, ordering, cursor/offset/page
//! └── pagination: PaginatorConfig # Default and maximum page sizes, counting
//! ```
//!
//! Pagination defaults can also be provided via environment variables
//! (`PAGINATION_DEFAULT_LIMIT`, `PAGINATION_MAX_LIMIT`,
//! `PAGINATION_INCLUDE_COUNT`).

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser};
use pagekit_core::{DEFAULT_TIE_BREAKER, PaginatorConfig, QueryContext, SortBy, SortOrder};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "pagekit")]
#[command(about = "Paginate a JSON array of records")]
#[command(version)]
pub struct Cli {
    /// Which rows to read and which page to return.
    #[clap(flatten)]
    pub query: QueryArgs,

    /// Engine-wide pagination defaults.
    #[clap(flatten)]
    pub pagination: PaginatorConfig,
}

/// Input and page selection.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Path to a JSON file holding an array of objects
    #[arg(short, long, env = "PAGEKIT_INPUT")]
    pub input: PathBuf,

    /// Field to order rows by
    #[arg(short, long, default_value = DEFAULT_TIE_BREAKER)]
    pub sort_field: String,

    /// Order rows in descending order
    #[arg(long)]
    pub desc: bool,

    /// Field breaking ties between equal sort values (always ascending)
    #[arg(long, default_value = DEFAULT_TIE_BREAKER)]
    pub tie_breaker: String,

    /// Requested page size
    #[arg(short, long)]
    pub limit: Option<u64>,

    /// Continue after this cursor token
    #[arg(long, conflicts_with_all = ["offset", "page"])]
    pub cursor: Option<String>,

    /// Skip this many rows instead of using a cursor
    #[arg(long, conflicts_with = "page")]
    pub offset: Option<u64>,

    /// Return this 1-based page number with page totals
    #[arg(long)]
    pub page: Option<u64>,

    /// Skip the total count (page totals always need it)
    #[arg(long, conflicts_with = "page")]
    pub no_count: bool,
}

impl QueryArgs {
    /// Returns the requested ordering.
    pub fn sort(&self) -> SortBy {
        let order = if self.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        SortBy::new(&self.sort_field, order)
    }

    /// Builds the query context for cursor and offset modes.
    pub fn context(&self) -> QueryContext {
        let mut ctx = QueryContext::new(self.sort())
            .with_tie_breaker(SortBy::asc(&self.tie_breaker));

        if let Some(limit) = self.limit {
            ctx = ctx.with_limit(limit);
        }
        if let Some(cursor) = &self.cursor {
            ctx = ctx.with_cursor(cursor);
        }
        if let Some(offset) = self.offset {
            ctx = ctx.with_offset(offset);
        }
        if self.no_count {
            ctx = ctx.with_count(false);
        }

        ctx
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Diagnostics go to stderr so stdout only carries the page.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pagination
            .validate()
            .context("invalid pagination configuration")?;

        if self.query.page == Some(0) {
            anyhow::bail!("page numbers start at 1");
        }

        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            input = %self.query.input.display(),
            sort = %self.query.sort(),
            tie_breaker = %self.query.tie_breaker,
            limit = ?self.query.limit,
            has_cursor = self.query.cursor.is_some(),
            offset = ?self.query.offset,
            page = ?self.query.page,
            default_limit = self.pagination.default_limit,
            max_limit = self.pagination.max_limit,
            include_count = self.pagination.include_count,
            "Pagination configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
