//! Persistent region store keyed by source document path
//!
//! One JSON file maps each document path to the rectangles drawn over it
//! and the scale factor they were drawn under:
//!
//! ```json
//! { "documents": { "<path>": { "scaleFactor": 0.5,
//!                              "rectangles": [[40.0,40.0,120.0,100.0]] } } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::DocumentRegions;
use crate::error::{Error, Result};

/// Durable mapping from document path to its saved regions.
///
/// The scale factor lives inside each document's entry, so editing two
/// documents with different native resolutions cannot clobber either one's
/// coordinate interpretation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionStore {
    pub documents: BTreeMap<String, DocumentRegions>,
}

impl RegionStore {
    /// Load the store file.
    ///
    /// A missing file is `StoreMissing` so callers can distinguish "no
    /// prior data" from a corrupt store; use [`RegionStore::load_or_empty`]
    /// when starting from scratch is fine.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::StoreMissing(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| Error::StoreCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the store, treating a missing file as an empty store.
    /// Corruption still surfaces; the store is never auto-repaired.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(store) => Ok(store),
            Err(Error::StoreMissing(_)) => {
                log::debug!("no region store at {}, starting empty", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Regions recorded for a document, or an empty set at scale 1.0
    pub fn regions_for(&self, document_id: &str) -> DocumentRegions {
        self.documents.get(document_id).cloned().unwrap_or_default()
    }

    /// Merge one document's regions into the store file.
    ///
    /// Read-modify-write keeps every other document's entry intact, and the
    /// temp-file replace means a failed write can never leave a torn store
    /// behind.
    pub fn save(path: &Path, document_id: &str, regions: DocumentRegions) -> Result<()> {
        let mut store = Self::load_or_empty(path)?;
        store.documents.insert(document_id.to_owned(), regions);
        store.write(path)
    }

    fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&tmp, self).map_err(|err| Error::Io(err.into()))?;
        tmp.persist(path).map_err(|err| Error::Io(err.error))?;
        Ok(())
    }
}

/// Default store location under the user data directory
pub fn default_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docmask")
        .join("regions.json")
}
