//! Per-row outcomes and the batch-level archive and manifest.

use std::time::Duration;

use serde::Serialize;

/// Outcome of one input row. Every row produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Success {
        row_index: usize,
        filename: String,
        bytes: Vec<u8>,
    },
    Failure(FailureEntry),
}

impl RenderResult {
    pub fn row_index(&self) -> usize {
        match self {
            RenderResult::Success { row_index, .. } => *row_index,
            RenderResult::Failure(entry) => entry.row_index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderResult::Success { .. })
    }
}

/// A row that failed to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    /// Zero-based position of the row in the input.
    pub row_index: usize,
    /// Sanitized identity label of the row.
    pub label: String,
    pub message: String,
}

impl FailureEntry {
    /// One-based row number for display.
    pub fn row_number(&self) -> usize {
        self.row_index + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub row_index: usize,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Successfully rendered documents in row order. Filenames are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: ArchiveEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.filename.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.bytes.len()).sum()
    }
}

/// Failures of one batch, in row order, with batch counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub total_rows: usize,
    pub generated: usize,
    pub failures: Vec<FailureEntry>,
}

impl Manifest {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Archive and manifest assembled from per-row results.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub archive: Archive,
    pub manifest: Manifest,
    pub duration: Duration,
}

impl BatchReport {
    /// Split results into archive entries and manifest failures, keeping
    /// row order. Results are sorted by row index first.
    pub fn from_results(mut results: Vec<RenderResult>, duration: Duration) -> Self {
        results.sort_by_key(RenderResult::row_index);
        let total_rows = results.len();
        let mut archive = Archive::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                RenderResult::Success {
                    row_index,
                    filename,
                    bytes,
                } => archive.push(ArchiveEntry {
                    row_index,
                    filename,
                    bytes,
                }),
                RenderResult::Failure(entry) => failures.push(entry),
            }
        }
        let manifest = Manifest {
            total_rows,
            generated: archive.len(),
            failures,
        };
        Self {
            archive,
            manifest,
            duration,
        }
    }
}
