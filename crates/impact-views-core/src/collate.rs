//! Key collation for index rows.
//!
//! Views only emit keys; the database orders them. This module reproduces
//! that order so rows can be sorted and range-filtered outside the database:
//!
//! ```text
//! null < false < true < numbers < strings < arrays < objects
//! ```
//!
//! Numbers compare numerically, strings by code point, arrays element by
//! element (a strict prefix sorts first), objects by their key/value pairs
//! in key order.
//!
//! # Example
//!
//! ```rust
//! use impact_views_core::collate::collate;
//! use serde_json::json;
//! use std::cmp::Ordering;
//!
//! assert_eq!(collate(&json!([0, "01"]), &json!([2, "01"])), Ordering::Less);
//! assert_eq!(collate(&json!(null), &json!(false)), Ordering::Less);
//! ```

use serde_json::Value;
use std::cmp::Ordering;

use crate::models::Row;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Compare two keys in index order.
pub fn collate(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (ex, ey) in x.iter().zip(y.iter()) {
                let ord = collate(ex, ey);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
                let ord = kx.cmp(ky).then_with(|| collate(vx, vy));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Sort rows by key, then by emitting document id.
pub fn sort_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| collate(&a.key, &b.key).then_with(|| a.id.cmp(&b.id)));
}

/// Whether `key` falls inside the inclusive range `[start, end]`.
///
/// A missing bound is open.
pub fn in_range(key: &Value, start: Option<&Value>, end: Option<&Value>) -> bool {
    if let Some(start) = start {
        if collate(key, start) == Ordering::Less {
            return false;
        }
    }
    if let Some(end) = end {
        if collate(key, end) == Ordering::Greater {
            return false;
        }
    }
    true
}
