//! Run every view over a document set and summarise the result.
//!
//! For each view the summary reports the row count and a SHA-256
//! fingerprint of the rows in index order. Views are pure, so the
//! fingerprint only changes when the input documents (or a view's
//! definition) change. Used by `tiviews run` to compare index builds.

use anyhow::Result;
use impact_views_core::models::{Document, Row};
use impact_views_core::views::{map_documents, ViewRegistry};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::loader::{load_documents, resolve_input};

/// Outcome of running one view.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSummary {
    /// Qualified view name (`queues/<name>`).
    pub view: String,
    pub rows: usize,
    /// Hex SHA-256 over the JSON-serialised rows, one per line.
    pub fingerprint: String,
}

/// Hash rows in the order given.
pub fn fingerprint(rows: &[Row]) -> Result<String> {
    let mut hasher = Sha256::new();
    for row in rows {
        hasher.update(serde_json::to_vec(row)?);
        hasher.update(b"\n");
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Run every registered view over `docs`.
pub fn summarize(registry: &ViewRegistry, docs: &[Document]) -> Result<Vec<ViewSummary>> {
    registry
        .views()
        .iter()
        .map(|view| {
            let rows = map_documents(&**view, docs);
            Ok(ViewSummary {
                view: view.qualified_name(),
                rows: rows.len(),
                fingerprint: fingerprint(&rows)?,
            })
        })
        .collect()
}

/// CLI entry point for `tiviews run`.
pub fn run_summary(config: &Config, input: Option<&Path>) -> Result<()> {
    let path = resolve_input(input, &config.input)?;
    let loaded = load_documents(&path, &config.input)?;
    let registry = ViewRegistry::builtin(&config.views.params());

    let summaries = summarize(&registry, &loaded.documents)?;
    info!(
        documents = loaded.documents.len(),
        skipped = loaded.skipped,
        views = summaries.len(),
        "ran all views"
    );

    if config.output.pretty {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{:<42} {:>8}   FINGERPRINT", "VIEW", "ROWS");
    println!("{}", "-".repeat(70));
    for s in &summaries {
        println!("{:<42} {:>8}   {}", s.view, s.rows, &s.fingerprint[..16]);
    }
    println!();
    println!(
        "  {} documents from {} file(s), {} skipped",
        loaded.documents.len(),
        loaded.files,
        loaded.skipped
    );
    Ok(())
}
