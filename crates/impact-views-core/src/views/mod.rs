//! Index projections.
//!
//! A [`View`] maps one [`Document`] to zero or more [`Row`]s. Views are pure:
//! no I/O, no shared state, and the same document always yields the same
//! rows. When a document lacks what a view needs, the view emits nothing;
//! there is no error path.
//!
//! All built-in views belong to the `queues` design document and are
//! addressed as `queues/<name>`.
//!
//! | View | Key | Value |
//! |------|-----|-------|
//! | `alias_freshness` | `[last_requested]` | id |
//! | `by_alias` | `[namespace, id]` | tiid |
//! | `by_alias_provider_batch_data` | `[provider, [namespace, id]]` | max event date |
//! | `aliases` | `[aliases.last_modified]` | document |
//! | `needs_aliases` | `needs_aliases` | document |
//! | `requested` | `last_requested` | `[id, last_queued]` |
//! | `gold_update` | `[year_group, month_group, days, updated, published]` | id |
//! | `metrics` | `[provider, last_requested, last_modified]` | document |
//! | `items_by_last_update_run` | last update | id |
//! | `doi_prefixes_by_last_update_run` | `[doi_prefix, last update]` | id |
//! | `collections_with_items` | `[collection, 0]` / `[collection, tiid]` | `null` / `{_id}` |
//! | `latest-collections` | `[is_test, created]` | `[title, count, ip]` |
//! | `collections_per_genre` | genre | id |
//! | `reference-sets` | `[id, title]` | refset metadata |
//! | `registered_items_by_alias` | `[alias, api_key]` | tiid |

pub mod alias;
pub mod collections;
pub mod gold_update;
pub mod items;
pub mod metrics;

use crate::collate::sort_rows;
use crate::models::{Document, Row};

/// Design document all built-in views are registered under.
pub const DESIGN_DOC: &str = "queues";

/// Tunables for the views that need them, decoupled from application config.
#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Collection titles starting with this are test collections.
    pub test_title_prefix: String,
    /// Collections last modified on or before this are left out of the
    /// genre index.
    pub genre_cutoff: String,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            test_title_prefix: "[ti test]".to_string(),
            genre_cutoff: "2013-06-16".to_string(),
        }
    }
}

/// A secondary-index projection.
///
/// # Example
///
/// ```rust
/// use impact_views_core::models::{Document, Row};
/// use impact_views_core::views::View;
/// use serde_json::{json, Value};
///
/// struct ByTitle;
///
/// impl View for ByTitle {
///     fn name(&self) -> &str { "by_title" }
///     fn description(&self) -> &str { "Documents keyed by title" }
///
///     fn map(&self, doc: &Document) -> Vec<Row> {
///         match &doc.title {
///             Some(title) => vec![Row::new(&doc.id, json!(title), Value::Null)],
///             None => Vec::new(),
///         }
///     }
/// }
/// ```
pub trait View: Send + Sync {
    /// Short name within the design document (e.g. `"by_alias"`).
    fn name(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Project one document into rows.
    fn map(&self, doc: &Document) -> Vec<Row>;

    /// `"<design>/<name>"`.
    fn qualified_name(&self) -> String {
        format!("{}/{}", DESIGN_DOC, self.name())
    }
}

/// Run `view` over every document and return the rows in index order.
pub fn map_documents(view: &dyn View, docs: &[Document]) -> Vec<Row> {
    let mut rows: Vec<Row> = docs.iter().flat_map(|doc| view.map(doc)).collect();
    sort_rows(&mut rows);
    rows
}

/// Ordered collection of views.
pub struct ViewRegistry {
    views: Vec<Box<dyn View>>,
}

impl ViewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { views: Vec::new() }
    }

    /// A registry holding every built-in view.
    pub fn builtin(params: &ViewParams) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(alias::AliasFreshness));
        registry.register(Box::new(alias::ByAlias));
        registry.register(Box::new(alias::ProviderBatchData));
        registry.register(Box::new(alias::AliasesByModified));
        registry.register(Box::new(alias::NeedsAliases));
        registry.register(Box::new(alias::Requested));
        registry.register(Box::new(gold_update::GoldUpdate));
        registry.register(Box::new(metrics::Metrics));
        registry.register(Box::new(items::ItemsByLastUpdateRun));
        registry.register(Box::new(items::DoiPrefixesByLastUpdateRun));
        registry.register(Box::new(items::RegisteredItemsByAlias));
        registry.register(Box::new(collections::CollectionsWithItems));
        registry.register(Box::new(collections::LatestCollections::new(
            params.test_title_prefix.clone(),
        )));
        registry.register(Box::new(collections::CollectionsPerGenre::new(
            params.genre_cutoff.clone(),
        )));
        registry.register(Box::new(collections::ReferenceSets));

        registry
    }

    /// Register a view. A later view with the same name shadows an earlier one.
    pub fn register(&mut self, view: Box<dyn View>) {
        self.views.retain(|v| v.name() != view.name());
        self.views.push(view);
    }

    /// All registered views, in registration order.
    pub fn views(&self) -> &[Box<dyn View>] {
        &self.views
    }

    /// Look up a view by short (`by_alias`) or qualified (`queues/by_alias`)
    /// name.
    pub fn get(&self, name: &str) -> Option<&dyn View> {
        let short = match name.split_once('/') {
            Some((design, short)) if design == DESIGN_DOC => short,
            Some(_) => return None,
            None => name,
        };
        self.views
            .iter()
            .find(|v| v.name() == short)
            .map(|v| &**v)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_names_are_unique() {
        let registry = ViewRegistry::builtin(&ViewParams::default());
        let mut names: Vec<&str> = registry.views().iter().map(|v| v.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 15);
    }

    #[test]
    fn test_get_by_short_and_qualified_name() {
        let registry = ViewRegistry::builtin(&ViewParams::default());
        assert_eq!(registry.get("by_alias").unwrap().name(), "by_alias");
        assert_eq!(
            registry.get("queues/gold_update").unwrap().qualified_name(),
            "queues/gold_update"
        );
        assert!(registry.get("other/by_alias").is_none());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_register_shadows_same_name() {
        struct Empty;
        impl View for Empty {
            fn name(&self) -> &str {
                "by_alias"
            }
            fn description(&self) -> &str {
                "empty"
            }
            fn map(&self, _doc: &Document) -> Vec<Row> {
                Vec::new()
            }
        }

        let mut registry = ViewRegistry::builtin(&ViewParams::default());
        let before = registry.len();
        registry.register(Box::new(Empty));
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("by_alias").unwrap().description(), "empty");
    }

    #[test]
    fn test_map_documents_sorts_and_is_repeatable() {
        let docs: Vec<Document> = vec![
            json!({"_id": "t2", "type": "item", "aliases": {"doi": "10.2/B", "url": "http://z"}}),
            json!({"_id": "t1", "type": "item", "aliases": {"doi": ["10.1/A"]}}),
        ]
        .into_iter()
        .map(|v| Document::from_value(v).unwrap())
        .collect();

        let registry = ViewRegistry::builtin(&ViewParams::default());
        let view = registry.get("by_alias").unwrap();
        let rows = map_documents(view, &docs);
        let keys: Vec<_> = rows.iter().map(|r| r.key.clone()).collect();
        assert_eq!(
            keys,
            vec![
                json!(["doi", "10.1/a"]),
                json!(["doi", "10.2/b"]),
                json!(["url", "http://z"])
            ]
        );

        let again = map_documents(view, &docs);
        assert_eq!(
            serde_json::to_string(&rows).unwrap(),
            serde_json::to_string(&again).unwrap()
        );
    }
}
