#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use pagekit_core::{Paginator, Queryable, SortOrder};
use pagekit_memory::{JsonRow, MemoryStore};
use serde_json::Value;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "pagekit_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "pagekit_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "pagination failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let paginator =
        Paginator::new(cli.pagination.clone()).context("failed to create paginator")?;
    let store = load_store(&cli).await?;

    let output = paginate(&paginator, &store, &cli).await?;
    let output = serde_json::to_string_pretty(&output).context("failed to render page")?;
    println!("{output}");

    Ok(())
}

/// Reads the input file into an in-memory store.
async fn load_store(cli: &Cli) -> anyhow::Result<MemoryStore<JsonRow>> {
    let path = &cli.query.input;
    let input = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    MemoryStore::from_json_str(&input)
        .with_context(|| format!("failed to load rows from {}", path.display()))
}

/// Runs the selected pagination mode and returns the page as JSON.
async fn paginate(
    paginator: &Paginator,
    store: &MemoryStore<JsonRow>,
    cli: &Cli,
) -> anyhow::Result<Value> {
    let Some(page) = cli.query.page else {
        let ctx = cli.query.context();
        let page = paginator
            .paginate(store.query(), &ctx)
            .await
            .context("failed to paginate rows")?;
        return Ok(serde_json::to_value(page)?);
    };

    let sort = cli.query.sort();
    let mut query = store.query();
    query.set_order(&sort.field, sort.order);
    if cli.query.tie_breaker != sort.field {
        query.add_order(&cli.query.tie_breaker, SortOrder::Asc);
    }

    let limit = cli.query.limit.unwrap_or(cli.pagination.default_limit);
    let page = paginator
        .offset_paginate(query, page, limit)
        .await
        .context("failed to paginate rows")?;

    Ok(serde_json::to_value(page)?)
}
