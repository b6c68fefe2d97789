//! Update-priority tiers.
//!
//! Items are bucketed by when they were published, then ordered inside each
//! bucket by how long after publication they were last refreshed. Rows that
//! sort first are the ones the updater should refresh first.
//!
//! # Published date
//!
//! 1. Start from the sentinel `1900-01-01T00:01:01.000Z`.
//! 2. If `created` parses, use it; if `biblio.year` is set, prefer
//!    December 31st of that year, clipped to `created`.
//! 3. A `biblio.date` overrides all of the above.
//! 4. Anything unparseable along the way falls back to the sentinel.
//!
//! # Key
//!
//! ```text
//! [year_group, month_group, days_since_published, last_updated, published]
//! ```
//!
//! `year_group` is 0 before 2012, 1 for 2012, 2 from 2013 on. Group 2 is
//! further split by published month (`"01"`..`"12"`); other groups use `"00"`.

use chrono::{DateTime, Datelike, Utc};
use serde_json::json;

use super::View;
use crate::dates::{days_between, parse_timestamp, sentinel, to_iso_millis, year_end};
use crate::models::{DocType, Document, Row};

/// Coarse publication-age bucket.
pub fn year_group(published: &DateTime<Utc>) -> u8 {
    match published.year() {
        y if y < 2012 => 0,
        2012 => 1,
        _ => 2,
    }
}

/// Published month for the newest bucket, `"00"` for the others.
pub fn month_group(published: &DateTime<Utc>) -> String {
    if year_group(published) == 2 {
        format!("{:02}", published.month())
    } else {
        "00".to_string()
    }
}

/// Best available publication date for an item. Never fails.
pub fn published_date(doc: &Document) -> DateTime<Utc> {
    let mut published = sentinel();

    if let Some(created_text) = doc.created.as_deref() {
        match parse_timestamp(created_text) {
            Some(created) => {
                published = created;
                if let Some(year) = doc.biblio.as_ref().and_then(|b| b.year.as_deref()) {
                    published = match year_end(year) {
                        Some(end) if end > created => created,
                        Some(end) => end,
                        None => created,
                    };
                }
            }
            None => published = sentinel(),
        }
    }

    if let Some(date) = doc.biblio.as_ref().and_then(|b| b.date.as_deref()) {
        published = parse_timestamp(date).unwrap_or_else(sentinel);
    }

    published
}

/// When the item was last refreshed: `last_update_run`, else
/// `last_modified`. `None` if the chosen stamp is missing or unparseable.
pub fn last_updated_date(doc: &Document) -> Option<DateTime<Utc>> {
    parse_timestamp(doc.last_updated()?)
}

/// Items bucketed into update-priority tiers.
pub struct GoldUpdate;

impl View for GoldUpdate {
    fn name(&self) -> &str {
        "gold_update"
    }

    fn description(&self) -> &str {
        "Items by publication tier, then days between publication and last update"
    }

    fn map(&self, doc: &Document) -> Vec<Row> {
        if !doc.is_type(&DocType::Item) {
            return Vec::new();
        }
        let last_updated = match last_updated_date(doc) {
            Some(ts) => ts,
            None => return Vec::new(),
        };
        let published = published_date(doc);

        let key = json!([
            year_group(&published),
            month_group(&published),
            days_between(&last_updated, &published),
            to_iso_millis(&last_updated),
            to_iso_millis(&published)
        ]);
        vec![Row::new(&doc.id, key, json!(doc.id))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::SENTINEL_PUBLISHED;
    use serde_json::Value;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_year_end_clipped_to_created() {
        let d = doc(json!({
            "_id": "t1",
            "type": "item",
            "created": "2011-01-01",
            "biblio": {"year": "2011"},
            "last_modified": "2013-06-20"
        }));
        assert_eq!(to_iso_millis(&published_date(&d)), "2011-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_year_end_used_when_before_created() {
        let d = doc(json!({
            "_id": "t1",
            "type": "item",
            "created": "2012-06-13T16:44:00.123456",
            "biblio": {"year": "2011"},
            "last_modified": "2013-06-20"
        }));
        let published = published_date(&d);
        assert_eq!(to_iso_millis(&published), "2011-12-31T00:01:01.000Z");

        let rows = GoldUpdate.map(&d);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].key,
            json!([
                0,
                "00",
                536,
                "2013-06-20T00:00:00.000Z",
                "2011-12-31T00:01:01.000Z"
            ])
        );
        assert_eq!(rows[0].value, json!("t1"));
    }

    #[test]
    fn test_numeric_year_accepted() {
        let d = doc(json!({
            "_id": "t1",
            "created": "2012-06-13",
            "biblio": {"year": 2010}
        }));
        assert_eq!(to_iso_millis(&published_date(&d)), "2010-12-31T00:01:01.000Z");
    }

    #[test]
    fn test_invalid_year_falls_back_to_created() {
        let d = doc(json!({
            "_id": "t1",
            "created": "2012-06-13",
            "biblio": {"year": "unknown"}
        }));
        assert_eq!(to_iso_millis(&published_date(&d)), "2012-06-13T00:00:00.000Z");
    }

    #[test]
    fn test_biblio_date_overrides_everything() {
        let d = doc(json!({
            "_id": "t1",
            "created": "2012-06-13",
            "biblio": {"year": "2011", "date": "2013-04-05"}
        }));
        assert_eq!(to_iso_millis(&published_date(&d)), "2013-04-05T00:00:00.000Z");
    }

    #[test]
    fn test_invalid_biblio_date_resets_to_sentinel() {
        let d = doc(json!({
            "_id": "t1",
            "created": "2012-06-13",
            "biblio": {"date": "spring 2013"}
        }));
        assert_eq!(to_iso_millis(&published_date(&d)), SENTINEL_PUBLISHED);
    }

    #[test]
    fn test_no_dates_uses_sentinel() {
        let d = doc(json!({"_id": "t1"}));
        assert_eq!(to_iso_millis(&published_date(&d)), SENTINEL_PUBLISHED);

        let bad_created = doc(json!({"_id": "t1", "created": "yesterday"}));
        assert_eq!(to_iso_millis(&published_date(&bad_created)), SENTINEL_PUBLISHED);
    }

    #[test]
    fn test_last_update_run_preferred_over_last_modified() {
        let d = doc(json!({
            "_id": "t1",
            "type": "item",
            "biblio": {"date": "2013-03-15"},
            "last_update_run": "2013-04-15T00:00:00",
            "last_modified": "2013-09-01T00:00:00"
        }));
        let rows = GoldUpdate.map(&d);
        assert_eq!(
            rows[0].key,
            json!([
                2,
                "03",
                31,
                "2013-04-15T00:00:00.000Z",
                "2013-03-15T00:00:00.000Z"
            ])
        );
    }

    #[test]
    fn test_year_group_2012() {
        let d = doc(json!({
            "_id": "t1",
            "type": "item",
            "biblio": {"date": "2012-08-01"},
            "last_modified": "2012-08-03"
        }));
        let key = &GoldUpdate.map(&d)[0].key;
        assert_eq!(key[0], json!(1));
        assert_eq!(key[1], json!("00"));
        assert_eq!(key[2], json!(2));
    }

    #[test]
    fn test_no_last_update_emits_nothing() {
        let d = doc(json!({"_id": "t1", "type": "item", "created": "2012-01-01"}));
        assert!(GoldUpdate.map(&d).is_empty());

        let bad = doc(json!({"_id": "t1", "type": "item", "last_modified": "never"}));
        assert!(GoldUpdate.map(&bad).is_empty());
    }

    #[test]
    fn test_non_items_ignored() {
        let d = doc(json!({"_id": "c1", "type": "collection", "last_modified": "2013-01-01"}));
        assert!(GoldUpdate.map(&d).is_empty());
    }
}
