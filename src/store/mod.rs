use tracing::{info, instrument};

pub mod backend;
pub mod error;
pub mod model;

#[cfg(test)]
mod tests;

pub use backend::{JsonFileBackend, StorageBackend};
pub use error::StoreError;
pub use model::{SaveRequest, ScreenshotRecord, SegmentSnapshot};

/// Append-only store for screenshot capture records.
///
/// The store owns the only durable copy of the collection; clients hold
/// transient copies fetched via `list`. Callers are expected to serialize
/// mutating operations (the HTTP layer funnels everything through a single
/// writer task); the store itself takes `&self` and trusts that discipline.
/// Cross-process writers are not coordinated.
pub struct ScreenshotStore {
    backend: Box<dyn StorageBackend>,
}

impl ScreenshotStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Validates the request, assigns id and timestamp, appends the record
    /// and rewrites the whole collection.
    ///
    /// Validation failures are reported before any storage access; a failed
    /// rewrite leaves the previously persisted collection unchanged.
    #[instrument(skip(self, request), fields(robot_id = ?request.robot_id))]
    pub fn save(&self, request: SaveRequest) -> Result<ScreenshotRecord, StoreError> {
        let mut record = ScreenshotRecord::from_request(request)?;

        let mut records = self.backend.load()?;
        while records.iter().any(|existing| existing.id == record.id) {
            record.id = model::new_record_id();
        }
        records.push(record.clone());
        self.backend.persist(&records)?;

        info!(
            "Saved screenshot {} for robot {} ({} stored)",
            record.id,
            record.robot_id,
            records.len()
        );
        Ok(record)
    }

    /// Returns all records, newest first.
    ///
    /// Missing or corrupted storage yields an empty list, never an error.
    pub fn list(&self) -> Result<Vec<ScreenshotRecord>, StoreError> {
        let mut records = self.backend.load()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Irreversibly removes all stored records by persisting the empty
    /// collection. Returns how many records were removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = self.backend.load()?.len();
        self.backend.persist(&[])?;
        info!("Cleared {} stored screenshots", removed);
        Ok(removed)
    }
}
