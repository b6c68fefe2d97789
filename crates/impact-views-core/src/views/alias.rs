//! Alias-driven views: reverse lookup, provider batch data, and the
//! freshness/queue projections that decide which items need alias work.

use serde_json::{json, Value};

use super::View;
use crate::models::{DocType, Document, Row};

/// Items whose aliases are stale relative to their latest request.
///
/// Emits `[last_requested] → id` when aliases have never been resolved, or
/// were last resolved before the item was requested again. Oldest pending
/// request sorts first.
pub struct AliasFreshness;

impl View for AliasFreshness {
    fn name(&self) -> &str {
        "alias_freshness"
    }

    fn description(&self) -> &str {
        "Items whose alias resolution predates their latest request"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        let aliases = match &doc.aliases {
            Some(aliases) => aliases,
            None => return Vec::new(),
        };
        let requested = match doc.last_requested.as_deref() {
            Some(ts) => ts,
            None => return Vec::new(),
        };

        let stale = match aliases.completion_marker() {
            None => true,
            Some(completed) => completed < requested,
        };
        if !stale {
            return Vec::new();
        }
        vec![Row::new(&doc.id, json!([requested]), json!(doc.id))]
    }
}

/// Case-insensitive reverse lookup from alias to item.
pub struct ByAlias;

impl View for ByAlias {
    fn name(&self) -> &str {
        "by_alias"
    }

    fn description(&self) -> &str {
        "Item ids by alias namespace and lowercased identifier"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Item) {
            return Vec::new();
        }
        let aliases = match &doc.aliases {
            Some(aliases) => aliases,
            None => return Vec::new(),
        };

        aliases
            .identifiers()
            .map(|(namespace, id)| {
                Row::new(&doc.id, json!([namespace, id.to_lowercase()]), json!(doc.id))
            })
            .collect()
    }
}

/// Latest event date a provider reported for an alias.
pub struct ProviderBatchData;

impl View for ProviderBatchData {
    fn name(&self) -> &str {
        "by_alias_provider_batch_data"
    }

    fn description(&self) -> &str {
        "Provider batch dumps by provider and alias, valued by max event date"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::ProviderDataDump) {
            return Vec::new();
        }
        let aliases = match &doc.aliases {
            Some(aliases) => aliases,
            None => return Vec::new(),
        };
        let max_event_date = doc.max_event_date.clone().unwrap_or(Value::Null);

        aliases
            .identifiers()
            .map(|(namespace, id)| {
                Row::new(
                    &doc.id,
                    json!([doc.provider, [namespace, id.to_lowercase()]]),
                    max_event_date.clone(),
                )
            })
            .collect()
    }
}

/// Documents ordered by when their aliases last changed.
pub struct AliasesByModified;

impl View for AliasesByModified {
    fn name(&self) -> &str {
        "aliases"
    }

    fn description(&self) -> &str {
        "Documents keyed by the last-modified time of their aliases"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        match doc.aliases.as_ref().and_then(|a| a.last_modified.as_deref()) {
            Some(modified) => vec![Row::new(&doc.id, json!([modified]), doc.raw().clone())],
            None => Vec::new(),
        }
    }
}

/// Items flagged for alias lookup, oldest flag first.
pub struct NeedsAliases;

impl View for NeedsAliases {
    fn name(&self) -> &str {
        "needs_aliases"
    }

    fn description(&self) -> &str {
        "Items keyed by the time they were flagged as needing aliases"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Item) {
            return Vec::new();
        }
        match doc.needs_aliases.as_deref() {
            Some(flagged) => vec![Row::new(&doc.id, json!(flagged), doc.raw().clone())],
            None => Vec::new(),
        }
    }
}

/// The request queue: documents requested but not queued since.
///
/// Value is `[id, last_queued]`, with `null` for never-queued documents.
pub struct Requested;

impl View for Requested {
    fn name(&self) -> &str {
        "requested"
    }

    fn description(&self) -> &str {
        "Documents requested after they were last queued, by request time"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        let requested = match doc.last_requested.as_deref() {
            Some(ts) => ts,
            None => return Vec::new(),
        };
        match doc.last_queued.as_deref() {
            None => vec![Row::new(&doc.id, json!(requested), json!([doc.id, null]))],
            Some(queued) if queued < requested => {
                vec![Row::new(&doc.id, json!(requested), json!([doc.id, queued]))]
            }
            Some(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_freshness_never_resolved_emits_request_time() {
        let d = doc(json!({
            "_id": "t1",
            "aliases": {"doi": ["10.1/a"]},
            "last_requested": "2013-01-02T00:00:00"
        }));
        let rows = AliasFreshness.map(&d);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, json!(["2013-01-02T00:00:00"]));
        assert_eq!(rows[0].value, json!("t1"));
    }

    #[test]
    fn test_freshness_resolved_after_request_emits_nothing() {
        let d = doc(json!({
            "_id": "t1",
            "aliases": {"last_completed": "2013-01-03T00:00:00"},
            "last_requested": "2013-01-02T00:00:00"
        }));
        assert!(AliasFreshness.map(&d).is_empty());

        let same = doc(json!({
            "_id": "t1",
            "aliases": {"last_completed": "2013-01-02T00:00:00"},
            "last_requested": "2013-01-02T00:00:00"
        }));
        assert!(AliasFreshness.map(&same).is_empty());
    }

    #[test]
    fn test_freshness_re_requested_after_resolution() {
        let d = doc(json!({
            "_id": "t1",
            "aliases": {"last_updated": "2013-01-01T00:00:00"},
            "last_requested": "2013-01-02T00:00:00"
        }));
        assert_eq!(AliasFreshness.map(&d).len(), 1);
    }

    #[test]
    fn test_freshness_requires_aliases_and_request() {
        let no_aliases = doc(json!({"_id": "t1", "last_requested": "2013-01-02"}));
        assert!(AliasFreshness.map(&no_aliases).is_empty());

        let no_request = doc(json!({"_id": "t1", "aliases": {}}));
        assert!(AliasFreshness.map(&no_request).is_empty());
    }

    #[test]
    fn test_by_alias_lowercases_and_skips_meta() {
        let d = doc(json!({
            "_id": "tiid1",
            "type": "item",
            "aliases": {
                "doi": "10.X/ABC",
                "created": "2012-01-01T00:00:00",
                "last_modified": "2012-01-02T00:00:00"
            }
        }));
        let rows = ByAlias.map(&d);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, json!(["doi", "10.x/abc"]));
        assert_eq!(rows[0].value, json!("tiid1"));
    }

    #[test]
    fn test_by_alias_skips_every_meta_key() {
        let d = doc(json!({
            "_id": "tiid1",
            "type": "item",
            "aliases": {
                "created": "2012-01-01T00:00:00",
                "last_modified": "2012-01-02T00:00:00",
                "last_updated": "2012-01-03T00:00:00",
                "last_completed": "2012-01-04T00:00:00",
                "pmid": ["123"],
                "url": "http://a"
            }
        }));
        let keys: Vec<Value> = ByAlias.map(&d).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![json!(["pmid", "123"]), json!(["url", "http://a"])]);
    }

    #[test]
    fn test_by_alias_does_not_dedupe() {
        let d = doc(json!({
            "_id": "tiid1",
            "type": "item",
            "aliases": {"url": ["HTTP://A", "http://a"], "doi": ["x"]}
        }));
        assert_eq!(ByAlias.map(&d).len(), 3);
    }

    #[test]
    fn test_by_alias_only_items() {
        let d = doc(json!({
            "_id": "c1",
            "type": "collection",
            "aliases": {"doi": "10.1/a"}
        }));
        assert!(ByAlias.map(&d).is_empty());
    }

    #[test]
    fn test_provider_batch_data_keys() {
        let d = doc(json!({
            "_id": "dump1",
            "type": "provider_data_dump",
            "provider": "pmc",
            "max_event_date": "2013-05-01T00:00:00",
            "aliases": {"pmid": ["123", "456"]}
        }));
        let rows = ProviderBatchData.map(&d);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, json!(["pmc", ["pmid", "123"]]));
        assert_eq!(rows[0].value, json!("2013-05-01T00:00:00"));
    }

    #[test]
    fn test_provider_batch_data_skips_every_meta_key() {
        let d = doc(json!({
            "_id": "dump1",
            "type": "provider_data_dump",
            "provider": "pmc",
            "aliases": {
                "created": "2012-01-01T00:00:00",
                "last_modified": "2012-01-02T00:00:00",
                "last_updated": "2012-01-03T00:00:00",
                "last_completed": "2012-01-04T00:00:00",
                "pmid": "123"
            }
        }));
        let keys: Vec<Value> = ProviderBatchData.map(&d).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![json!(["pmc", ["pmid", "123"]])]);
    }

    #[test]
    fn test_provider_batch_data_missing_event_date_is_null() {
        let d = doc(json!({
            "_id": "dump1",
            "type": "provider_data_dump",
            "provider": "pmc",
            "aliases": {"pmid": "1"}
        }));
        assert_eq!(ProviderBatchData.map(&d)[0].value, Value::Null);
    }

    #[test]
    fn test_aliases_by_modified_emits_whole_document() {
        let raw = json!({"_id": "t1", "aliases": {"last_modified": "2012-02-02"}});
        let rows = AliasesByModified.map(&doc(raw.clone()));
        assert_eq!(rows[0].key, json!(["2012-02-02"]));
        assert_eq!(rows[0].value, raw);
    }

    #[test]
    fn test_needs_aliases_items_only() {
        let item = doc(json!({"_id": "t1", "type": "item", "needs_aliases": "2012-02-02"}));
        assert_eq!(NeedsAliases.map(&item)[0].key, json!("2012-02-02"));

        let other = doc(json!({"_id": "u1", "type": "api_user", "needs_aliases": "2012-02-02"}));
        assert!(NeedsAliases.map(&other).is_empty());
    }

    #[test]
    fn test_requested_queue_states() {
        let never = doc(json!({"_id": "t1", "last_requested": "2013-01-02"}));
        let rows = Requested.map(&never);
        assert_eq!(rows[0].key, json!("2013-01-02"));
        assert_eq!(rows[0].value, json!(["t1", null]));

        let re_requested = doc(json!({
            "_id": "t1",
            "last_requested": "2013-01-02",
            "last_queued": "2013-01-01"
        }));
        assert_eq!(Requested.map(&re_requested)[0].value, json!(["t1", "2013-01-01"]));

        let queued = doc(json!({
            "_id": "t1",
            "last_requested": "2013-01-02",
            "last_queued": "2013-01-03"
        }));
        assert!(Requested.map(&queued).is_empty());
    }
}
