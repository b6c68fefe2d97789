//! Item scheduling views and API-user registrations.

use serde_json::{json, Value};

use super::View;
use crate::models::{DocType, Document, Row};

/// Items ordered by their last update.
pub struct ItemsByLastUpdateRun;

impl View for ItemsByLastUpdateRun {
    fn name(&self) -> &str {
        "items_by_last_update_run"
    }

    fn description(&self) -> &str {
        "Items keyed by last update run, falling back to last modified"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Item) {
            return Vec::new();
        }
        match doc.last_updated() {
            Some(ts) => vec![Row::new(&doc.id, json!(ts), json!(doc.id))],
            None => Vec::new(),
        }
    }
}

/// Registrant prefix of a DOI: everything before the first `.` that follows
/// the leading `10.` (so `10.1371/journal.pone.1` gives `10.1371`).
pub fn doi_prefix(doi: &str) -> Option<&str> {
    let rest = doi.get(3..)?;
    let period = rest.find('.')?;
    Some(&doi[..3 + period])
}

/// Items grouped by DOI registrant, then by last update.
pub struct DoiPrefixesByLastUpdateRun;

impl View for DoiPrefixesByLastUpdateRun {
    fn name(&self) -> &str {
        "doi_prefixes_by_last_update_run"
    }

    fn description(&self) -> &str {
        "Items keyed by DOI prefix and last update run"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Item) {
            return Vec::new();
        }
        let prefix = match doc
            .aliases
            .as_ref()
            .and_then(|a| a.first("doi"))
            .and_then(doi_prefix)
        {
            Some(prefix) => prefix,
            None => return Vec::new(),
        };
        vec![Row::new(
            &doc.id,
            json!([prefix, doc.last_updated()]),
            json!(doc.id),
        )]
    }
}

/// Items registered by API users, keyed by alias and the user's key.
pub struct RegisteredItemsByAlias;

impl View for RegisteredItemsByAlias {
    fn name(&self) -> &str {
        "registered_items_by_alias"
    }

    fn description(&self) -> &str {
        "Registered tiids by alias and lowercased API key"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::ApiUser) {
            return Vec::new();
        }
        let (key, items) = match (&doc.current_key, &doc.registered_items) {
            (Some(key), Some(items)) => (key.to_lowercase(), items),
            _ => return Vec::new(),
        };

        items
            .iter()
            .map(|(alias, tiid)| {
                let value = tiid.as_ref().map(|t| json!(t)).unwrap_or(Value::Null);
                Row::new(&doc.id, json!([alias, key]), value)
            })
            .collect()
    }
}
