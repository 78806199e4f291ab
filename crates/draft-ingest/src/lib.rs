//! Tabular input loading.
//!
//! The batch pipeline consumes an ordered sequence of [`Row`]s. This crate
//! turns a CSV table into that sequence: polars reads and types the table,
//! and each DataFrame row becomes one `Row` in table order.
//!
//! [`Row`]: draft_model::Row

pub mod error;
pub mod frame;
pub mod reader;

pub use error::{IngestError, Result};
pub use frame::{any_to_raw, rows_from_frame};
pub use reader::{
    MAX_TABLE_FILE_SIZE, ReadOptions, check_file_size, read_rows, read_table, validate_encoding,
};
