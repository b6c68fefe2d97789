//! Per-provider update state derived from an item's metrics.
//!
//! Metric names have the form `"provider:metric"`, so the provider list is
//! recovered from the metric keys. Each provider is emitted once with the
//! newest modification stamp across its metrics.

use serde_json::json;
use std::collections::BTreeMap;

use super::View;
use crate::models::{Document, Row};

#[derive(Debug, Default)]
struct ProviderState<'a> {
    last_modified: Option<&'a str>,
    last_requested: Option<&'a str>,
}

/// Keep the later of two optional ISO stamps.
fn latest<'a>(current: Option<&'a str>, candidate: Option<&'a str>) -> Option<&'a str> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(if b > a { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Provider name: everything before the first `:`.
pub fn provider_name(metric_name: &str) -> &str {
    metric_name.split(':').next().unwrap_or(metric_name)
}

/// Items by provider, request time, and last metric change.
pub struct Metrics;

impl View for Metrics {
    fn name(&self) -> &str {
        "metrics"
    }

    fn description(&self) -> &str {
        "Items by provider, last request time, and last metric update"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        let metrics = match &doc.metrics {
            Some(metrics) => metrics,
            None => return Vec::new(),
        };

        let mut providers: BTreeMap<&str, ProviderState> = BTreeMap::new();
        for (metric_name, entry) in metrics {
            if entry.ignore {
                continue;
            }
            let state = providers.entry(provider_name(metric_name)).or_default();
            state.last_modified = latest(state.last_modified, entry.last_modified());
            state.last_requested = latest(state.last_requested, entry.last_requested());
        }

        providers
            .into_iter()
            .map(|(provider, state)| {
                let requested = doc.last_requested.as_deref().or(state.last_requested);
                Row::new(
                    &doc.id,
                    json!([provider, requested, state.last_modified]),
                    doc.raw().clone(),
                )
            })
            .collect()
    }
}
