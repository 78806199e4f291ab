//! Batch configuration: an optional TOML file with command-line overrides.
//!
//! ```toml
//! [batch]
//! date_columns = ["effective_date", "signed_on"]
//! identity_column = "contract_id"
//! render_timeout_ms = 5000
//! workers = 4
//!
//! [table]
//! infer_types = false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use draft_ingest::ReadOptions;
use draft_model::BatchOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DraftConfig {
    pub batch: BatchOptions,
    pub table: TableConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Infer numeric and date column types. When false every cell is text.
    pub infer_types: bool,
    pub infer_schema_length: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        let defaults = ReadOptions::default();
        Self {
            infer_types: defaults.infer_types,
            infer_schema_length: defaults.infer_schema_length,
        }
    }
}

impl TableConfig {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            infer_types: self.infer_types,
            infer_schema_length: self.infer_schema_length,
        }
    }
}

impl DraftConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse configuration")
    }

    /// Load `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("load configuration {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Settings given on the command line; each one that is set wins over the
/// file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub identity_column: Option<String>,
    /// Replaces the configured date columns when non-empty.
    pub date_columns: Vec<String>,
    pub extension: Option<String>,
    pub timeout_ms: Option<u64>,
    pub workers: Option<usize>,
    pub text_only: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: DraftConfig) -> DraftConfig {
        let mut batch = config.batch;
        if let Some(column) = &self.identity_column {
            batch = batch.with_identity_column(column.clone());
        }
        if !self.date_columns.is_empty() {
            batch = batch.with_date_columns(self.date_columns.iter().map(String::as_str));
        }
        if let Some(extension) = &self.extension {
            batch = batch.with_extension(extension.clone());
        }
        if let Some(ms) = self.timeout_ms {
            batch = batch.with_render_timeout((ms > 0).then_some(Duration::from_millis(ms)));
        }
        if let Some(workers) = self.workers {
            batch = batch.with_workers(workers);
        }
        config.batch = batch;
        if self.text_only {
            config.table.infer_types = false;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DraftConfig::from_toml("").unwrap();
        assert_eq!(config, DraftConfig::default());
        assert!(config.table.infer_types);
    }

    #[test]
    fn reads_batch_and_table_sections() {
        let config = DraftConfig::from_toml(
            r#"
            [batch]
            identity_column = "ref"
            date_columns = ["signed_on"]
            workers = 3

            [table]
            infer_types = false
            "#,
        )
        .unwrap();
        assert_eq!(config.batch.identity_column, "ref");
        assert!(config.batch.is_date_column("signed_on"));
        assert!(!config.batch.is_date_column("effective_date"));
        assert_eq!(config.batch.workers, 3);
        assert!(!config.table.read_options().infer_types);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(DraftConfig::from_toml("[batch]\nidentity = \"x\"").is_err());
        assert!(DraftConfig::from_toml("[output]\npath = \"x\"").is_err());
    }

    #[test]
    fn overrides_win_over_the_file() {
        let file = DraftConfig::from_toml("[batch]\nidentity_column = \"ref\"\nworkers = 2").unwrap();
        let overrides = Overrides {
            identity_column: Some("id".to_string()),
            date_columns: vec!["due".to_string()],
            timeout_ms: Some(250),
            text_only: true,
            ..Overrides::default()
        };
        let config = overrides.apply(file);
        assert_eq!(config.batch.identity_column, "id");
        assert!(config.batch.is_date_column("due"));
        assert!(!config.batch.is_date_column("start_date"));
        assert_eq!(config.batch.render_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.batch.workers, 2);
        assert!(!config.table.infer_types);
    }

    #[test]
    fn zero_timeout_disables_the_limit() {
        let overrides = Overrides {
            timeout_ms: Some(0),
            ..Overrides::default()
        };
        let config = overrides.apply(DraftConfig::default());
        assert_eq!(config.batch.render_timeout(), None);
    }
}
