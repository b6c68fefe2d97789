//! Document set overview.
//!
//! Counts loaded documents by `type` so a quick look confirms the input
//! holds what the views expect. Used by `tiviews stats`.

use anyhow::Result;
use impact_views_core::models::Document;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Config;
use crate::loader::{load_documents, resolve_input};

/// Label for documents without a `type`.
const UNTYPED: &str = "(untyped)";

/// Document counts keyed by type tag.
pub fn count_by_type(docs: &[Document]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for doc in docs {
        let tag = doc
            .doc_type
            .as_ref()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| UNTYPED.to_string());
        *counts.entry(tag).or_insert(0) += 1;
    }
    counts
}

/// CLI entry point for `tiviews stats`.
pub fn run_stats(config: &Config, input: Option<&Path>) -> Result<()> {
    let path = resolve_input(input, &config.input)?;
    let loaded = load_documents(&path, &config.input)?;
    let counts = count_by_type(&loaded.documents);

    println!("impact-views: Document Stats");
    println!("============================");
    println!();
    println!("  Input:       {}", path.display());
    println!("  Files:       {}", loaded.files);
    println!("  Documents:   {}", loaded.documents.len());
    println!("  Skipped:     {}", loaded.skipped);

    if !counts.is_empty() {
        println!();
        println!("  By type:");
        println!("  {:<24} {:>8}", "TYPE", "DOCS");
        println!("  {}", "-".repeat(33));
        for (tag, count) in &counts {
            println!("  {:<24} {:>8}", tag, count);
        }
    }
    println!();

    Ok(())
}
