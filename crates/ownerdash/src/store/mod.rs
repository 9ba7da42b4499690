//! Edit persistence for ownerdash.
//!
//! Two independent edit maps (`Rv_Owner` and `Packer`) map a mailing address
//! to a free-text value. Each lives in its own JSON file and is rewritten
//! wholesale on every save. Persisted maps never contain empty values: an
//! empty submission for a key removes that key.

mod file;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DataConfig;
use crate::error::{Error, Result};

pub use file::{EditFile, StagedWrite};

/// Mailing address to edit value. Sorted so renders and files are stable.
pub type EditMap = BTreeMap<String, String>;

/// The editable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    /// The `Rv_Owner` column.
    Rv,
    /// The `Packer` column.
    Packer,
}

impl EditField {
    /// Both fields, in display order.
    pub const ALL: [Self; 2] = [Self::Rv, Self::Packer];

    /// Column heading shown on the page and in exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rv => "Rv_Owner",
            Self::Packer => "Packer",
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rv => write!(f, "rv"),
            Self::Packer => write!(f, "packer"),
        }
    }
}

/// Both edit maps as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Edits {
    /// `Rv_Owner` edits.
    pub rv: EditMap,
    /// `Packer` edits.
    pub packer: EditMap,
}

impl Edits {
    /// The map for `field`.
    #[must_use]
    pub fn map(&self, field: EditField) -> &EditMap {
        match field {
            EditField::Rv => &self.rv,
            EditField::Packer => &self.packer,
        }
    }

    /// The edit value for `address` in `field`, if any.
    #[must_use]
    pub fn value(&self, field: EditField, address: &str) -> Option<&str> {
        self.map(field).get(address).map(String::as_str)
    }

    /// Number of entries in `field`.
    #[must_use]
    pub fn count(&self, field: EditField) -> usize {
        self.map(field).len()
    }
}

/// Body of a `POST /saveall` request.
///
/// Missing or `null` maps are treated as empty; a missing `merge` is `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveRequest {
    /// Submitted `Rv_Owner` edits.
    #[serde(default)]
    pub rv: Option<EditMap>,
    /// Submitted `Packer` edits.
    #[serde(default)]
    pub packer: Option<EditMap>,
    /// Overlay onto the stored maps instead of replacing them.
    #[serde(default)]
    pub merge: Option<bool>,
}

impl SaveRequest {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the body is not JSON or does not
    /// match the expected shape.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Whether this is a merge save.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.merge.unwrap_or(false)
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Entries in the stored `Rv_Owner` map after the save.
    pub rv: usize,
    /// Entries in the stored `Packer` map after the save.
    pub packer: usize,
    /// Whether the save was a merge.
    pub merged: bool,
}

/// Owns both edit files and serializes writes to them.
#[derive(Debug)]
pub struct EditStore {
    rv: EditFile,
    packer: EditFile,
    write_lock: Mutex<()>,
}

impl EditStore {
    /// Create a store over the two given files.
    #[must_use]
    pub fn new(rv_path: impl Into<PathBuf>, packer_path: impl Into<PathBuf>) -> Self {
        Self {
            rv: EditFile::new(rv_path),
            packer: EditFile::new(packer_path),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store from the configured file locations.
    #[must_use]
    pub fn from_config(data: &DataConfig) -> Self {
        Self::new(&data.rv_edits_path, &data.packer_edits_path)
    }

    /// The file backing `field`.
    #[must_use]
    pub fn file(&self, field: EditField) -> &EditFile {
        match field {
            EditField::Rv => &self.rv,
            EditField::Packer => &self.packer,
        }
    }

    /// Read both maps. Missing files read as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if either file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Edits> {
        Ok(Edits {
            rv: self.rv.load()?,
            packer: self.packer.load()?,
        })
    }

    /// Persist a save request.
    ///
    /// Submitted values are trimmed. With `merge`, each submitted map is
    /// overlaid on the stored one and empty values delete their key; blank
    /// values already on disk are dropped as well. Without
    /// it, the non-empty submitted entries replace the stored map, dropping
    /// any key not submitted.
    ///
    /// Both files are fully written to temporaries before either is renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored maps cannot be read (merge only) or
    /// either file cannot be written.
    pub fn save_all(&self, request: SaveRequest) -> Result<SaveOutcome> {
        let merged = request.is_merge();
        let submitted_rv = request.rv.unwrap_or_default();
        let submitted_packer = request.packer.unwrap_or_default();

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (rv, packer) = if merged {
            let current = self.load()?;
            (
                merge_into(normalize(current.rv), submitted_rv),
                merge_into(normalize(current.packer), submitted_packer),
            )
        } else {
            (normalize(submitted_rv), normalize(submitted_packer))
        };

        let staged_rv = self.rv.stage(&rv)?;
        let staged_packer = self.packer.stage(&packer)?;
        staged_rv.commit()?;
        staged_packer.commit()?;

        if merged {
            info!("Merged edits - RV: {}, Packer: {}", rv.len(), packer.len());
        } else {
            info!("Saved {} RV edits, {} Packer edits", rv.len(), packer.len());
        }

        Ok(SaveOutcome {
            rv: rv.len(),
            packer: packer.len(),
            merged,
        })
    }

    /// Reset both maps to empty.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let staged_rv = self.rv.stage(&EditMap::new())?;
        let staged_packer = self.packer.stage(&EditMap::new())?;
        staged_rv.commit()?;
        staged_packer.commit()?;

        info!("Cleared all edits");
        Ok(())
    }
}

/// Trim values and drop the ones left empty.
fn normalize(submitted: EditMap) -> EditMap {
    submitted
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.trim();
            (!value.is_empty()).then(|| (key, value.to_string()))
        })
        .collect()
}

/// Overlay `submitted` on `current`; empty submitted values remove the key.
fn merge_into(mut current: EditMap, submitted: EditMap) -> EditMap {
    for (key, value) in submitted {
        let value = value.trim();
        if value.is_empty() {
            current.remove(&key);
        } else {
            current.insert(key, value.to_string());
        }
    }
    current
}
