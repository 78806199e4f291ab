//! Output generation: the downloadable archive and the failure manifest.

pub mod archive;
pub mod atomic;
pub mod error;
pub mod manifest;

pub use archive::{archive_to_bytes, default_archive_name, write_archive, write_archive_file};
pub use error::{OutputError, Result};
pub use manifest::{manifest_to_json, write_manifest_file};
