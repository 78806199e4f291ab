//! Configuration consumed by the batch pipeline.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Columns that receive date formatting unless overridden.
pub const DEFAULT_DATE_COLUMNS: [&str; 3] = ["effective_date", "start_date", "end_date"];

/// Column whose value names each output document.
pub const DEFAULT_IDENTITY_COLUMN: &str = "contract_id";

/// Label used when the identity value is blank.
pub const DEFAULT_FALLBACK_LABEL: &str = "contract";

pub const DEFAULT_MAX_FILENAME_LEN: usize = 80;

pub const DEFAULT_EXTENSION: &str = ".docx";

/// Options for one batch run.
///
/// Immutable for the duration of a batch; pass a different value to
/// override per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchOptions {
    /// Columns normalized as calendar dates (exact, case-sensitive names).
    pub date_columns: BTreeSet<String>,
    /// Column feeding the name sanitizer.
    pub identity_column: String,
    /// Substituted when the identity value trims to empty.
    pub fallback_label: String,
    /// Upper bound on the sanitized name, before any collision suffix.
    pub max_filename_len: usize,
    /// Archive entry extension, with or without the leading dot.
    pub extension: String,
    /// Per-row render timeout in milliseconds. `None` waits indefinitely.
    pub render_timeout_ms: Option<u64>,
    /// Number of render workers. `0` and `1` both mean sequential.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            date_columns: DEFAULT_DATE_COLUMNS.iter().map(ToString::to_string).collect(),
            identity_column: DEFAULT_IDENTITY_COLUMN.to_string(),
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
            max_filename_len: DEFAULT_MAX_FILENAME_LEN,
            extension: DEFAULT_EXTENSION.to_string(),
            render_timeout_ms: None,
            workers: 1,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the date column set.
    #[must_use]
    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_identity_column(mut self, column: impl Into<String>) -> Self {
        self.identity_column = column.into();
        self
    }

    #[must_use]
    pub fn with_fallback_label(mut self, label: impl Into<String>) -> Self {
        self.fallback_label = label.into();
        self
    }

    #[must_use]
    pub fn with_max_filename_len(mut self, len: usize) -> Self {
        self.max_filename_len = len;
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_render_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.render_timeout_ms = timeout.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn is_date_column(&self, column: &str) -> bool {
        self.date_columns.contains(column)
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        self.render_timeout_ms.map(Duration::from_millis)
    }

    /// Worker count clamped to at least one.
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    /// The extension with exactly one leading dot, or empty for none.
    pub fn extension_suffix(&self) -> String {
        let trimmed = self.extension.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!(".{trimmed}")
        }
    }

    /// Max filename length clamped to at least one character.
    pub fn effective_max_filename_len(&self) -> usize {
        self.max_filename_len.max(1)
    }
}
