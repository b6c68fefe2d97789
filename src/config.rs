//! TOML configuration.
//!
//! Every section is optional. A missing config file yields
//! [`Config::default`], so `tiviews` runs without one.
//!
//! ```toml
//! [input]
//! path = "./data/docs"
//! include_globs = ["**/*.json", "**/*.jsonl"]
//! exclude_globs = []
//!
//! [views]
//! test_title_prefix = "[ti test]"
//! genre_cutoff = "2013-06-16"
//!
//! [output]
//! pretty = false
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use impact_views_core::views::ViewParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::observability::LogFormat;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Default document source when `--input` is not given.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.json".to_string(), "**/*.jsonl".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewsConfig {
    #[serde(default = "default_test_title_prefix")]
    pub test_title_prefix: String,
    #[serde(default = "default_genre_cutoff")]
    pub genre_cutoff: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            test_title_prefix: default_test_title_prefix(),
            genre_cutoff: default_genre_cutoff(),
        }
    }
}

fn default_test_title_prefix() -> String {
    "[ti test]".to_string()
}
fn default_genre_cutoff() -> String {
    "2013-06-16".to_string()
}

impl ViewsConfig {
    pub fn params(&self) -> ViewParams {
        ViewParams {
            test_title_prefix: self.test_title_prefix.clone(),
            genre_cutoff: self.genre_cutoff.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// Pretty-print JSON rows instead of one row per line.
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Load and validate the config at `path`, or return defaults if the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.views.test_title_prefix.is_empty() {
        anyhow::bail!("views.test_title_prefix must not be empty");
    }

    if NaiveDate::parse_from_str(&config.views.genre_cutoff, "%Y-%m-%d").is_err() {
        anyhow::bail!(
            "views.genre_cutoff must be a YYYY-MM-DD date, got '{}'",
            config.views.genre_cutoff
        );
    }

    if config.input.include_globs.is_empty() {
        anyhow::bail!("input.include_globs must list at least one pattern");
    }

    LogFormat::parse(&config.logging.format)?;

    Ok(())
}
