//! CSV table reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use draft_model::Row;
use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::frame::rows_from_frame;

/// Maximum table file size (100 MB default).
pub const MAX_TABLE_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// How column types are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Infer numeric and boolean column types from the first rows.
    ///
    /// When false every column is read as text, which keeps identifiers
    /// such as `007` intact.
    pub infer_types: bool,
    /// Rows sampled for type inference.
    pub infer_schema_length: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            infer_types: true,
            infer_schema_length: 100,
        }
    }
}

impl ReadOptions {
    /// Read every column as text.
    #[must_use]
    pub fn text_only() -> Self {
        Self {
            infer_types: false,
            ..Self::default()
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Check file size against [`MAX_TABLE_FILE_SIZE`].
pub fn check_file_size(path: &Path) -> Result<()> {
    let metadata = open(path)?.metadata().map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() > MAX_TABLE_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_TABLE_FILE_SIZE,
        });
    }

    Ok(())
}

/// Reject UTF-16 files; UTF-8 with or without BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open(path)?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Read a CSV table with a single header row into a DataFrame.
///
/// Empty cells arrive as nulls.
pub fn read_table(path: &Path, options: ReadOptions) -> Result<DataFrame> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let infer_length = if options.infer_types {
        Some(options.infer_schema_length.max(1))
    } else {
        Some(0)
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_length)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate_shape(&df, path)?;
    Ok(df)
}

/// Read a CSV table straight into rows, in table order.
pub fn read_rows(path: &Path, options: ReadOptions) -> Result<Vec<Row>> {
    let df = read_table(path, options)?;
    let rows = rows_from_frame(&df);
    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = df.width(),
        "table loaded"
    );
    Ok(rows)
}

fn validate_shape(df: &DataFrame, path: &Path) -> Result<()> {
    if df.height() == 0 {
        return Err(IngestError::NoDataRows {
            path: path.to_path_buf(),
        });
    }

    for name in df.get_column_names() {
        if name.trim().is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}
