use draft_model::{Manifest, TemplateError};
use thiserror::Error;

/// Batch-level failures. Row-level failures never surface here; they are
/// recorded in the manifest.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The template is unusable; no row was processed.
    #[error("invalid template: {0}")]
    Template(#[from] TemplateError),

    #[error("no input rows")]
    EmptyInput,

    /// Every row failed; the manifest lists why.
    #[error("all {} rows failed to render", manifest.total_rows)]
    AllRowsFailed { manifest: Manifest },

    /// The batch was cancelled; partial output was discarded.
    #[error("batch cancelled after {processed} of {total} rows")]
    Cancelled { processed: usize, total: usize },
}

impl BatchError {
    /// The failure manifest, when the batch got far enough to produce one.
    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            BatchError::AllRowsFailed { manifest } => Some(manifest),
            _ => None,
        }
    }
}
