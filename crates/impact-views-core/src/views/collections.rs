//! Collection views: membership, recency listing, genre tags, and
//! reference sets.

use serde_json::{json, Value};

use super::View;
use crate::models::{DocType, Document, Row};

/// Substrings that mark an alias as belonging to a genre. `":"` tags any
/// namespaced alias.
const GENRE_MARKERS: [&str; 9] = [
    ":",
    "doi",
    "pmid",
    "biblio",
    "github",
    "figshare",
    "dryad",
    "slideshare",
    "url",
];

/// Markers that make a collection count as holding articles.
const ARTICLE_MARKERS: [&str; 3] = ["pmid", "doi", "biblio"];

/// Member tiids of a collection: string `alias_tiids` values, else `item_tiids`.
fn member_tiids(doc: &Document) -> Vec<&str> {
    match (&doc.alias_tiids, &doc.item_tiids) {
        (Some(alias_tiids), _) => alias_tiids.values().filter_map(|t| t.as_deref()).collect(),
        (None, Some(item_tiids)) => item_tiids.tiids(),
        (None, None) => Vec::new(),
    }
}

/// Collection membership: a sentinel row per collection plus one per item.
///
/// Querying `[cid, 0]..[cid, {}]` returns the collection followed by its
/// members.
pub struct CollectionsWithItems;

impl View for CollectionsWithItems {
    fn name(&self) -> &str {
        "collections_with_items"
    }

    fn description(&self) -> &str {
        "Collection sentinel row followed by one row per member item"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Collection) {
            return Vec::new();
        }
        let mut rows = vec![Row::new(&doc.id, json!([doc.id, 0]), Value::Null)];
        rows.extend(
            member_tiids(doc)
                .into_iter()
                .map(|tiid| Row::new(&doc.id, json!([doc.id, tiid]), json!({ "_id": tiid }))),
        );
        rows
    }
}

/// Collections by test flag and creation time.
pub struct LatestCollections {
    test_title_prefix: String,
}

impl LatestCollections {
    pub fn new(test_title_prefix: String) -> Self {
        Self { test_title_prefix }
    }
}

impl View for LatestCollections {
    fn name(&self) -> &str {
        "latest-collections"
    }

    fn description(&self) -> &str {
        "Collections by test flag and creation time, with title, size, and creator IP"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Collection) {
            return Vec::new();
        }
        let title = match doc.title.as_deref() {
            Some(title) => title,
            None => return Vec::new(),
        };
        let is_test = u8::from(title.starts_with(&self.test_title_prefix));
        let member_count = match (&doc.alias_tiids, &doc.item_tiids) {
            (Some(alias_tiids), _) => alias_tiids.len(),
            (None, Some(item_tiids)) => item_tiids.len(),
            (None, None) => 0,
        };
        let ip_address = doc.ip_address.as_deref().unwrap_or("");
        // Older collections store `created` as epoch seconds.
        let created = doc.raw().get("created").cloned().unwrap_or(Value::Null);

        vec![Row::new(
            &doc.id,
            json!([is_test, created]),
            json!([title, member_count, ip_address]),
        )]
    }
}

/// Genre tags for recently modified collections.
pub struct CollectionsPerGenre {
    cutoff: String,
}

impl CollectionsPerGenre {
    pub fn new(cutoff: String) -> Self {
        Self { cutoff }
    }
}

impl View for CollectionsPerGenre {
    fn name(&self) -> &str {
        "collections_per_genre"
    }

    fn description(&self) -> &str {
        "Collection ids by the genres of alias they contain"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Collection) {
            return Vec::new();
        }
        let alias_tiids = match &doc.alias_tiids {
            Some(alias_tiids) => alias_tiids,
            None => return Vec::new(),
        };
        match doc.last_modified.as_deref() {
            Some(modified) if modified > self.cutoff.as_str() => {}
            _ => return Vec::new(),
        }

        let lowered: Vec<String> = alias_tiids.keys().map(|a| a.to_lowercase()).collect();
        let found: Vec<&str> = GENRE_MARKERS
            .iter()
            .copied()
            .filter(|marker| lowered.iter().any(|alias| alias.contains(marker)))
            .collect();

        let mut rows: Vec<Row> = found
            .iter()
            .map(|genre| Row::new(&doc.id, json!(genre), json!(doc.id)))
            .collect();
        if found.iter().any(|g| ARTICLE_MARKERS.contains(g)) {
            rows.push(Row::new(&doc.id, json!("article"), json!(doc.id)));
        }
        rows
    }
}

/// Collections that serve as normalization reference sets.
pub struct ReferenceSets;

impl View for ReferenceSets {
    fn name(&self) -> &str {
        "reference-sets"
    }

    fn description(&self) -> &str {
        "Reference-set collections with their refset metadata"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Collection) {
            return Vec::new();
        }
        match &doc.refset_metadata {
            Some(meta) => vec![Row::new(&doc.id, json!([doc.id, doc.title]), meta.clone())],
            None => Vec::new(),
        }
    }
}
