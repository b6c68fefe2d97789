//! # impact-views core
//!
//! Secondary-index projections for the altmetrics document store: typed
//! documents, the views that map them to index rows, and the key collation
//! used to order those rows.
//!
//! This crate does no I/O and holds no state. Every view is a pure function
//! of one document, so callers may run views over documents in any order
//! or in parallel.

pub mod collate;
pub mod dates;
pub mod models;
pub mod views;
