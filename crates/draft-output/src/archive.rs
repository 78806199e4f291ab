//! ZIP container for the rendered documents.
//!
//! Layout is deterministic: entries appear in archive (row) order, every
//! entry carries the DOS epoch timestamp, and content is deflated.

use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use draft_model::Archive;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::atomic::AtomicFile;
use crate::error::{OutputError, Result};

/// Default archive name for a batch: `contracts_<generated>.zip`.
pub fn default_archive_name(generated: usize) -> String {
    format!("contracts_{generated}.zip")
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

/// Stream the archive into `writer`, returning it after the central
/// directory is written.
pub fn write_archive<W: Write + Seek>(archive: &Archive, writer: W) -> Result<W> {
    if archive.is_empty() {
        return Err(OutputError::EmptyArchive);
    }
    let options = entry_options();
    let mut zip = ZipWriter::new(writer);
    for entry in archive.entries() {
        zip.start_file(entry.filename.as_str(), options)?;
        zip.write_all(&entry.bytes)
            .map_err(|e| OutputError::io(&entry.filename, e))?;
    }
    Ok(zip.finish()?)
}

/// Build the archive in memory.
pub fn archive_to_bytes(archive: &Archive) -> Result<Vec<u8>> {
    let cursor = write_archive(archive, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// Write the archive to `path` atomically.
///
/// The destination only appears once the whole container has been written;
/// on any error the partial temporary file is removed.
pub fn write_archive_file(archive: &Archive, path: &Path) -> Result<PathBuf> {
    let mut target = AtomicFile::new(path)?;
    write_archive(archive, target.as_file_mut())?;
    let written = target.finish()?;
    tracing::info!(
        path = %written.display(),
        entries = archive.len(),
        bytes = archive.total_bytes(),
        "archive written"
    );
    Ok(written)
}
