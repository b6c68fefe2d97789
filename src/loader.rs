//! Document loading.
//!
//! Documents come from a single file, a directory tree, or stdin (`-`):
//!
//! - `*.jsonl` and stdin: one document per line, blank lines ignored.
//! - anything else: one JSON value, either a document or an array of them.
//!
//! Directories are walked recursively and filtered by the configured
//! include/exclude globs; files are read in path order so runs are
//! reproducible. A file that cannot be read or parsed is an error. A value
//! that parses but is not a usable document (no `_id`, not an object) is
//! logged and skipped.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use impact_views_core::models::Document;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::InputConfig;

/// Documents loaded from one input, with bookkeeping for logging.
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<Document>,
    pub files: usize,
    pub skipped: usize,
}

impl LoadedDocuments {
    fn push_value(&mut self, value: Value, origin: &str) {
        match Document::from_value(value) {
            Ok(doc) => self.documents.push(doc),
            Err(e) => {
                warn!(origin, error = %e, "skipping document");
                self.skipped += 1;
            }
        }
    }

    fn push_lines(&mut self, text: &str, origin: &str) {
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(value) => self.push_value(value, origin),
                Err(e) => {
                    warn!(origin, line = index + 1, error = %e, "skipping malformed line");
                    self.skipped += 1;
                }
            }
        }
    }

    fn push_json(&mut self, text: &str, origin: &str) -> Result<()> {
        let value: Value =
            serde_json::from_str(text).with_context(|| format!("Failed to parse JSON in {}", origin))?;
        match value {
            Value::Array(values) => {
                for value in values {
                    self.push_value(value, origin);
                }
            }
            other => self.push_value(other, origin),
        }
        Ok(())
    }
}

/// Resolve the input path: the CLI flag wins over `[input].path`.
pub fn resolve_input(cli_input: Option<&Path>, config: &InputConfig) -> Result<PathBuf> {
    match cli_input.or(config.path.as_deref()) {
        Some(path) => Ok(path.to_path_buf()),
        None => bail!("No input given. Pass --input or set [input].path in the config file."),
    }
}

/// Load every document reachable from `path`.
pub fn load_documents(path: &Path, config: &InputConfig) -> Result<LoadedDocuments> {
    let mut loaded = LoadedDocuments::default();

    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read documents from stdin")?;
        loaded.push_lines(&text, "<stdin>");
        loaded.files = 1;
        return Ok(loaded);
    }

    if !path.exists() {
        bail!("Input path does not exist: {}", path.display());
    }

    let files = if path.is_dir() {
        scan_directory(path, config)?
    } else {
        vec![path.to_path_buf()]
    };

    for file in &files {
        load_file(file, &mut loaded)?;
    }
    loaded.files = files.len();

    debug!(
        files = loaded.files,
        documents = loaded.documents.len(),
        skipped = loaded.skipped,
        "loaded documents"
    );
    Ok(loaded)
}

fn load_file(path: &Path, loaded: &mut LoadedDocuments) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let origin = path.display().to_string();

    let is_jsonl = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
        .unwrap_or(false);
    if is_jsonl {
        loaded.push_lines(&text, &origin);
        Ok(())
    } else {
        loaded.push_json(&text, &origin)
    }
}

fn scan_directory(root: &Path, config: &InputConfig) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(&config.include_globs)?;
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(config.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    // Sort for deterministic ordering
    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_single_document_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.json");
        fs::write(&path, r#"{"_id": "t1", "type": "item"}"#).unwrap();

        let loaded = load_documents(&path, &InputConfig::default()).unwrap();
        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.documents[0].id, "t1");
        assert_eq!(loaded.files, 1);
    }

    #[test]
    fn test_array_file_skips_unusable_documents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs.json");
        fs::write(&path, r#"[{"_id": "t1"}, {"type": "item"}, 42, {"_id": "t2"}]"#).unwrap();

        let loaded = load_documents(&path, &InputConfig::default()).unwrap();
        let ids: Vec<&str> = loaded.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(loaded.skipped, 2);
    }

    #[test]
    fn test_jsonl_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs.jsonl");
        fs::write(&path, "{\"_id\": \"t1\"}\n\n{broken\n{\"_id\": \"t2\"}\n").unwrap();

        let loaded = load_documents(&path, &InputConfig::default()).unwrap();
        assert_eq!(loaded.documents.len(), 2);
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn test_malformed_json_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_documents(&path, &InputConfig::default()).is_err());
    }

    #[test]
    fn test_directory_walk_respects_globs_and_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("skip")).unwrap();
        fs::write(root.join("b/2.json"), r#"{"_id": "second"}"#).unwrap();
        fs::write(root.join("a.jsonl"), "{\"_id\": \"first\"}\n").unwrap();
        fs::write(root.join("notes.txt"), "not a document").unwrap();
        fs::write(root.join("skip/3.json"), r#"{"_id": "excluded"}"#).unwrap();

        let config = InputConfig {
            exclude_globs: vec!["skip/**".to_string()],
            ..InputConfig::default()
        };
        let loaded = load_documents(root, &config).unwrap();
        let ids: Vec<&str> = loaded.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(loaded.files, 2);
    }

    #[test]
    fn test_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(load_documents(&tmp.path().join("nope"), &InputConfig::default()).is_err());
    }

    #[test]
    fn test_resolve_input_prefers_cli() {
        let config = InputConfig {
            path: Some(PathBuf::from("from-config")),
            ..InputConfig::default()
        };
        assert_eq!(
            resolve_input(Some(Path::new("from-cli")), &config).unwrap(),
            PathBuf::from("from-cli")
        );
        assert_eq!(resolve_input(None, &config).unwrap(), PathBuf::from("from-config"));
        assert!(resolve_input(None, &InputConfig::default()).is_err());
    }
}
