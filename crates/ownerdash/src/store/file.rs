//! A single JSON edit map on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::EditMap;
use crate::error::{Error, Result};

/// One edit map file.
///
/// Reads treat a missing file as an empty map. Writes go to a temporary file
/// in the same directory which is then renamed over the target, so a crash
/// mid-write never leaves a truncated map behind.
#[derive(Debug, Clone)]
pub struct EditFile {
    path: PathBuf,
}

/// A fully written temporary file waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl EditFile {
    /// Create a handle for the edit map at `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the edit map file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditFileRead`] if the file exists but cannot be read,
    /// and [`Error::EditFileParse`] if it is not a JSON object of strings.
    pub fn load(&self) -> Result<EditMap> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No edit file at {}, starting empty", self.path.display());
                return Ok(EditMap::new());
            }
            Err(source) => {
                return Err(Error::EditFileRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| Error::EditFileParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file contents with `map`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditFileWrite`] if the temporary file cannot be
    /// written or renamed.
    pub fn save(&self, map: &EditMap) -> Result<()> {
        self.stage(map)?.commit()
    }

    /// Replace the file contents with an empty map.
    ///
    /// # Errors
    ///
    /// See [`EditFile::save`].
    pub fn clear(&self) -> Result<()> {
        self.save(&EditMap::new())
    }

    /// Write `map` to a temporary file next to the target without touching
    /// the target itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditFileWrite`] if the directory or temporary file
    /// cannot be created or written.
    pub fn stage(&self, map: &EditMap) -> Result<StagedWrite> {
        let write_err = |source: std::io::Error| Error::EditFileWrite {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut temp, map)?;
        temp.write_all(b"\n").map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;

        Ok(StagedWrite {
            temp,
            target: self.path.clone(),
        })
    }
}

impl StagedWrite {
    /// Rename the staged file over its target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EditFileWrite`] if the rename fails.
    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| Error::EditFileWrite {
                path: target.clone(),
                source: e.error,
            })?;
        debug!("Wrote {}", target.display());
        Ok(())
    }
}
