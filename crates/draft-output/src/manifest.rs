//! Failure manifest serialization.

use std::path::{Path, PathBuf};

use draft_model::Manifest;

use crate::atomic::AtomicFile;
use crate::error::Result;

/// Pretty-printed JSON, terminated by a newline.
pub fn manifest_to_json(manifest: &Manifest) -> Result<String> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    Ok(json)
}

pub fn write_manifest_file(manifest: &Manifest, path: &Path) -> Result<PathBuf> {
    let json = manifest_to_json(manifest)?;
    AtomicFile::new(path)?.write_all_and_finish(json.as_bytes())
}
