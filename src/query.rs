//! Run one view over a document set and print its rows.
//!
//! Rows come back in index order and can be narrowed to an inclusive key
//! range, mirroring `startkey`/`endkey`/`descending`/`limit` on a view
//! request. Used by `tiviews map`.

use anyhow::{Context, Result};
use impact_views_core::collate::in_range;
use impact_views_core::models::{Document, Row};
use impact_views_core::views::{map_documents, ViewRegistry};
use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::loader::{load_documents, resolve_input};

/// Range and paging options for a view query.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub start_key: Option<Value>,
    pub end_key: Option<Value>,
    /// Return rows in reverse index order. As with the database, the start
    /// key is then the upper bound.
    pub descending: bool,
    pub limit: Option<usize>,
}

/// Parse a key given on the command line as JSON.
pub fn parse_key(flag: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{} is not valid JSON: {}", flag, text))
}

/// Query `view_name` over `docs`.
pub fn query_view(
    registry: &ViewRegistry,
    view_name: &str,
    docs: &[Document],
    options: &QueryOptions,
) -> Result<Vec<Row>> {
    let view = registry.get(view_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown view: {}. Run `tiviews views` to list available views.",
            view_name
        )
    })?;

    let mut rows = map_documents(view, docs);

    let (lower, upper) = if options.descending {
        rows.reverse();
        (options.end_key.as_ref(), options.start_key.as_ref())
    } else {
        (options.start_key.as_ref(), options.end_key.as_ref())
    };
    rows.retain(|row| in_range(&row.key, lower, upper));

    if let Some(limit) = options.limit {
        rows.truncate(limit);
    }
    Ok(rows)
}

/// CLI entry point for `tiviews map`.
pub fn run_map(
    config: &Config,
    view_name: &str,
    input: Option<&Path>,
    options: &QueryOptions,
) -> Result<()> {
    let path = resolve_input(input, &config.input)?;
    let loaded = load_documents(&path, &config.input)?;
    let registry = ViewRegistry::builtin(&config.views.params());

    let rows = query_view(&registry, view_name, &loaded.documents, options)?;
    info!(
        view = view_name,
        documents = loaded.documents.len(),
        rows = rows.len(),
        "mapped view"
    );

    for row in &rows {
        let line = if config.output.pretty {
            serde_json::to_string_pretty(row)?
        } else {
            serde_json::to_string(row)?
        };
        println!("{}", line);
    }
    Ok(())
}
