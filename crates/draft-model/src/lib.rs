//! Data model definitions for batch document generation.
//!
//! Everything in this crate is created and consumed within a single batch
//! invocation; nothing here holds state across batches.

pub mod context;
pub mod error;
pub mod options;
pub mod result;
pub mod value;

pub use context::RenderContext;
pub use error::{RenderError, TemplateError};
pub use options::{
    BatchOptions, DEFAULT_DATE_COLUMNS, DEFAULT_EXTENSION, DEFAULT_FALLBACK_LABEL,
    DEFAULT_IDENTITY_COLUMN, DEFAULT_MAX_FILENAME_LEN,
};
pub use result::{Archive, ArchiveEntry, BatchReport, FailureEntry, Manifest, RenderResult};
pub use value::{RawValue, Row};
