//! Typed documents and index rows.
//!
//! Documents arrive as loosely-shaped JSON. [`Document::from_value`] decodes
//! every field into an `Option`, treating a field of the wrong JSON type as
//! absent. A malformed field therefore only suppresses the rows that depend
//! on it; it never rejects the document.
//!
//! Only two things make a document unusable: a non-object root, or a missing
//! (or non-string) `_id`.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Alias keys that carry bookkeeping timestamps rather than identifiers.
pub const ALIAS_META_KEYS: [&str; 4] =
    ["created", "last_modified", "last_updated", "last_completed"];

/// The `type` tag of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocType {
    Item,
    Collection,
    ApiUser,
    ProviderDataDump,
    /// A tag no projection is scoped to. Kept so stats can report it.
    Other(String),
}

impl DocType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "item" => DocType::Item,
            "collection" => DocType::Collection,
            "api_user" => DocType::ApiUser,
            "provider_data_dump" => DocType::ProviderDataDump,
            other => DocType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocType::Item => "item",
            DocType::Collection => "collection",
            DocType::ApiUser => "api_user",
            DocType::ProviderDataDump => "provider_data_dump",
            DocType::Other(tag) => tag,
        }
    }
}

/// The `aliases` record of an item or provider data dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aliases {
    /// Namespace → identifiers. A bare string is stored as a one-element list;
    /// non-string identifiers are dropped.
    pub namespaces: BTreeMap<String, Vec<String>>,
    pub created: Option<String>,
    pub last_modified: Option<String>,
    pub last_updated: Option<String>,
    pub last_completed: Option<String>,
}

impl Aliases {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let mut namespaces = BTreeMap::new();
        for (namespace, ids) in obj {
            if ALIAS_META_KEYS.contains(&namespace.as_str()) {
                continue;
            }
            let ids = match ids {
                Value::String(s) => vec![s.clone()],
                Value::Array(list) => list
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            namespaces.insert(namespace.clone(), ids);
        }

        Self {
            namespaces,
            created: string_field(obj, "created"),
            last_modified: string_field(obj, "last_modified"),
            last_updated: string_field(obj, "last_updated"),
            last_completed: string_field(obj, "last_completed"),
        }
    }

    /// The timestamp at which alias resolution last finished, if ever.
    ///
    /// `last_completed` is the current marker; `last_updated` is what older
    /// documents carry.
    pub fn completion_marker(&self) -> Option<&str> {
        self.last_completed
            .as_deref()
            .or(self.last_updated.as_deref())
    }

    /// Iterate `(namespace, identifier)` pairs, meta keys excluded.
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .flat_map(|(ns, ids)| ids.iter().map(move |id| (ns.as_str(), id.as_str())))
    }

    /// The first identifier listed under `namespace`.
    pub fn first(&self, namespace: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|ids| ids.first())
            .map(String::as_str)
    }
}

/// Bibliographic data. Only the fields the projections read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Biblio {
    /// Publication year as text. Numeric years are stringified.
    pub year: Option<String>,
    /// Full publication date, as written.
    pub date: Option<String>,
}

/// Request/modify stamps nested under `update_meta` or `meta`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaStamps {
    pub last_requested: Option<String>,
    pub last_modified: Option<String>,
}

impl MetaStamps {
    fn from_value(value: Option<&Value>) -> Option<Self> {
        let obj = value?.as_object()?;
        Some(Self {
            last_requested: string_field(obj, "last_requested"),
            last_modified: string_field(obj, "last_modified"),
        })
    }
}

/// One entry of the `metrics` map, keyed `"provider:metric"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricEntry {
    pub ignore: bool,
    /// Timestamps the metric has values for, in ascending order.
    pub value_stamps: Vec<String>,
    pub update_meta: Option<MetaStamps>,
    pub meta: Option<MetaStamps>,
}

impl MetricEntry {
    fn from_value(value: &Value) -> Self {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => return Self::default(),
        };
        let mut value_stamps: Vec<String> = obj
            .get("values")
            .and_then(Value::as_object)
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default();
        value_stamps.sort();

        Self {
            ignore: obj.get("ignore").map(truthy).unwrap_or(false),
            value_stamps,
            update_meta: MetaStamps::from_value(obj.get("update_meta")),
            meta: MetaStamps::from_value(obj.get("meta")),
        }
    }

    /// When this metric last changed: newest value stamp, else the stamp
    /// recorded in `update_meta`, else the one in `meta`.
    pub fn last_modified(&self) -> Option<&str> {
        self.value_stamps
            .last()
            .map(String::as_str)
            .or_else(|| self.update_meta.as_ref()?.last_modified.as_deref())
            .or_else(|| self.meta.as_ref()?.last_modified.as_deref())
    }

    /// The request stamp recorded on the metric itself, if any.
    pub fn last_requested(&self) -> Option<&str> {
        self.update_meta
            .as_ref()
            .and_then(|m| m.last_requested.as_deref())
            .or_else(|| self.meta.as_ref()?.last_requested.as_deref())
    }
}

/// `item_tiids` on a collection: a map in current documents, a bare list in
/// older ones.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemTiids {
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

impl ItemTiids {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(ItemTiids::Map(string_map(obj))),
            Value::Array(list) => Some(ItemTiids::List(
                list.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            )),
            _ => None,
        }
    }

    pub fn tiids(&self) -> Vec<&str> {
        match self {
            ItemTiids::Map(map) => map.values().map(String::as_str).collect(),
            ItemTiids::List(list) => list.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ItemTiids::Map(map) => map.len(),
            ItemTiids::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub doc_type: Option<DocType>,
    pub aliases: Option<Aliases>,
    pub created: Option<String>,
    pub last_requested: Option<String>,
    pub last_queued: Option<String>,
    pub last_modified: Option<String>,
    pub last_update_run: Option<String>,
    pub needs_aliases: Option<String>,
    pub biblio: Option<Biblio>,
    pub metrics: Option<BTreeMap<String, MetricEntry>>,
    /// Alias → tiid. Every alias is kept; the tiid is `None` when not a string.
    pub alias_tiids: Option<BTreeMap<String, Option<String>>>,
    pub item_tiids: Option<ItemTiids>,
    pub title: Option<String>,
    pub ip_address: Option<String>,
    pub refset_metadata: Option<Value>,
    pub provider: Option<String>,
    pub max_event_date: Option<Value>,
    pub current_key: Option<String>,
    /// Registered alias → tiid (`None` when the registration lacks one).
    pub registered_items: Option<BTreeMap<String, Option<String>>>,
    raw: Value,
}

impl Document {
    /// Decode a raw JSON document.
    pub fn from_value(raw: Value) -> Result<Self> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => bail!("document is not a JSON object"),
        };
        let id = match obj.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => bail!("document has no string _id"),
        };

        let biblio = obj.get("biblio").and_then(Value::as_object).map(|b| Biblio {
            year: b.get("year").and_then(scalar_text),
            date: b.get("date").and_then(scalar_text),
        });

        let metrics = obj.get("metrics").and_then(Value::as_object).map(|m| {
            m.iter()
                .map(|(name, entry)| (name.clone(), MetricEntry::from_value(entry)))
                .collect()
        });

        let registered_items = obj
            .get("registered_items")
            .and_then(Value::as_object)
            .map(|items| {
                items
                    .iter()
                    .map(|(alias, reg)| {
                        let tiid = reg.get("tiid").and_then(Value::as_str).map(str::to_string);
                        (alias.clone(), tiid)
                    })
                    .collect()
            });

        Ok(Self {
            id,
            doc_type: obj.get("type").and_then(Value::as_str).map(DocType::parse),
            aliases: obj
                .get("aliases")
                .and_then(Value::as_object)
                .map(Aliases::from_object),
            created: string_field(obj, "created"),
            last_requested: string_field(obj, "last_requested"),
            last_queued: string_field(obj, "last_queued"),
            last_modified: string_field(obj, "last_modified"),
            last_update_run: string_field(obj, "last_update_run"),
            needs_aliases: string_field(obj, "needs_aliases"),
            biblio,
            metrics,
            alias_tiids: obj.get("alias_tiids").and_then(Value::as_object).map(|m| {
                m.iter()
                    .map(|(alias, tiid)| (alias.clone(), tiid.as_str().map(str::to_string)))
                    .collect()
            }),
            item_tiids: obj.get("item_tiids").and_then(ItemTiids::from_value),
            title: string_field(obj, "title"),
            ip_address: string_field(obj, "ip_address"),
            refset_metadata: present(obj.get("refset_metadata")),
            provider: string_field(obj, "provider"),
            max_event_date: present(obj.get("max_event_date")),
            current_key: string_field(obj, "current_key"),
            registered_items,
            raw,
        })
    }

    /// Parse and decode a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// The document exactly as loaded, for views that emit it whole.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn is_type(&self, doc_type: &DocType) -> bool {
        self.doc_type.as_ref() == Some(doc_type)
    }

    /// `last_update_run`, falling back to `last_modified`.
    pub fn last_updated(&self) -> Option<&str> {
        self.last_update_run
            .as_deref()
            .or(self.last_modified.as_deref())
    }
}

/// One emitted index row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Id of the document that emitted the row.
    pub id: String,
    pub key: Value,
    pub value: Value,
}

impl Row {
    pub fn new(id: &str, key: Value, value: Value) -> Self {
        Self {
            id: id.to_string(),
            key,
            value,
        }
    }
}

fn string_field(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_map(obj: &Map<String, Value>) -> BTreeMap<String, String> {
    obj.iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

/// Strings as-is, numbers stringified, anything else absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Explicit `null` counts as absent.
fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
