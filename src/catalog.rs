//! View listings and the design document.
//!
//! `tiviews views` prints the registered views; `tiviews design` prints a
//! design document naming them, for comparison with what is deployed.

use anyhow::Result;
use impact_views_core::views::{ViewRegistry, DESIGN_DOC};
use serde_json::{json, Map, Value};

use crate::config::Config;

/// Design document JSON for every registered view.
pub fn design_document(registry: &ViewRegistry) -> Value {
    let views: Map<String, Value> = registry
        .views()
        .iter()
        .map(|v| (v.name().to_string(), json!({ "description": v.description() })))
        .collect();

    json!({
        "_id": format!("_design/{}", DESIGN_DOC),
        "language": "rust",
        "views": views,
    })
}

/// CLI entry point for `tiviews views`.
pub fn list_views(config: &Config) -> Result<()> {
    let registry = ViewRegistry::builtin(&config.views.params());

    println!("{:<42} DESCRIPTION", "VIEW");
    for view in registry.views() {
        println!("{:<42} {}", view.qualified_name(), view.description());
    }
    Ok(())
}

/// CLI entry point for `tiviews design`.
pub fn run_design(config: &Config) -> Result<()> {
    let registry = ViewRegistry::builtin(&config.views.params());
    println!("{}", serde_json::to_string_pretty(&design_document(&registry))?);
    Ok(())
}
