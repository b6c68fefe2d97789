//! # impact-views
//!
//! Secondary-index projections over an altmetrics document store.
//!
//! The view functions themselves live in `impact-views-core`: each one maps
//! a single stored document (item, collection, api user, provider data
//! dump) to zero or more `(key, value)` rows, and the index is those rows
//! sorted by key in collation order. This crate wraps them in a CLI that
//! loads documents from disk, evaluates views, and reports on the result.
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  JSON/JSONL │──▶│   Document   │──▶│  View::map   │──▶ sorted rows
//! │  files      │   │   decoding   │   │  (queues/*)  │
//! └─────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tiviews views                                  # list views
//! tiviews map by_alias --input ./docs            # rows of one view
//! tiviews map gold_update --input ./docs --limit 10
//! tiviews run --input ./docs                     # every view, with fingerprints
//! tiviews stats --input ./docs
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`loader`] | Reading documents from files, directories and stdin |
//! | [`query`] | Single-view evaluation with key ranges |
//! | [`summary`] | All-view evaluation with row fingerprints |
//! | [`stats`] | Document counts by type |
//! | [`catalog`] | View listing and design document output |
//! | [`observability`] | Logging setup |

pub mod catalog;
pub mod config;
pub mod loader;
pub mod observability;
pub mod query;
pub mod stats;
pub mod summary;
