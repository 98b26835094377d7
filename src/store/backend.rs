use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::store::error::StoreError;
use crate::store::model::ScreenshotRecord;

/// Storage abstraction for the screenshot collection.
///
/// The collection is always loaded and persisted whole; there is no
/// incremental append at this layer. Swapping the backend (e.g. for an
/// embedded key-value store) must not require touching the request logic.
pub trait StorageBackend: Send {
    /// Loads the full collection. Absent storage yields an empty collection.
    fn load(&self) -> Result<Vec<ScreenshotRecord>, StoreError>;

    /// Rewrites the full collection. Persisting an empty slice clears it.
    fn persist(&self, records: &[ScreenshotRecord]) -> Result<(), StoreError>;
}

/// The production backend: a single JSON array in one file on local disk.
///
/// Every persist rewrites the whole file, so each save costs O(n) in the
/// number of stored records. Fine for the dozens-to-hundreds of captures
/// this service sees; a scalability ceiling beyond that.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<ScreenshotRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Store file {} does not exist yet, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<ScreenshotRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                // Accepted recovery policy: a corrupted collection is reset
                // to empty rather than failing reads or blocking saves.
                warn!("Store file {} is corrupted ({}), treating collection as empty", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    fn persist(&self, records: &[ScreenshotRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(records)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, body)?;
        debug!("Persisted {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
