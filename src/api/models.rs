use serde::Serialize;
use tokio::sync::oneshot;

use crate::store::{SaveRequest, ScreenshotRecord, StoreError};

/// Operations accepted by the store writer task.
///
/// Each job carries the oneshot sender the writer answers on. Reads go
/// through the same queue as writes so a list can never observe a
/// half-rewritten file.
#[derive(Debug)]
pub enum StoreJob {
    Save {
        request: SaveRequest,
        response_tx: oneshot::Sender<Result<ScreenshotRecord, StoreError>>,
    },
    List {
        response_tx: oneshot::Sender<Result<Vec<ScreenshotRecord>, StoreError>>,
    },
    Clear {
        response_tx: oneshot::Sender<Result<usize, StoreError>>,
    },
}

/// Response for a successful save
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub id: String,
}

/// Response for a successful clear
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

/// Error response for API endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// healthy, degraded, or unhealthy
    pub status: String,

    /// Jobs currently waiting for the writer
    pub queued_jobs: usize,

    /// Total capacity of the writer queue
    pub queue_capacity: usize,

    /// Server uptime in seconds
    pub uptime_secs: u64,
}
