//! Write-then-rename file output.
//!
//! Content goes to a temporary file next to the destination and replaces
//! the destination only on [`AtomicFile::finish`]. Dropping an unfinished
//! writer deletes the temporary file, so an aborted batch leaves nothing
//! behind.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{OutputError, Result};

pub struct AtomicFile {
    file: NamedTempFile,
    final_path: PathBuf,
}

impl AtomicFile {
    /// Create the temporary file in the destination directory.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self> {
        let final_path = final_path.as_ref().to_path_buf();
        let parent = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file = NamedTempFile::new_in(&parent).map_err(|e| OutputError::io(&parent, e))?;
        Ok(Self { file, final_path })
    }

    /// Write all of `bytes` and persist.
    pub fn write_all_and_finish(mut self, bytes: &[u8]) -> Result<PathBuf> {
        {
            let mut writer = BufWriter::new(self.file.as_file_mut());
            writer
                .write_all(bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| OutputError::io(&self.final_path, e))?;
        }
        self.finish()
    }

    /// Seekable handle for streaming writers such as ZIP.
    pub fn as_file_mut(&mut self) -> &mut std::fs::File {
        self.file.as_file_mut()
    }

    /// Flush and atomically move the temporary file into place.
    pub fn finish(mut self) -> Result<PathBuf> {
        let final_path = self.final_path;
        let file = self.file.as_file_mut();
        file.flush()
            .and_then(|()| file.sync_all())
            .map_err(|e| OutputError::io(&final_path, e))?;
        self.file
            .persist(&final_path)
            .map_err(|e| OutputError::io(&final_path, e.error))?;
        Ok(final_path)
    }
}
