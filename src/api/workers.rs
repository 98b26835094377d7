use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::models::StoreJob;
use crate::store::ScreenshotStore;

/// Starts the single writer task that owns the store.
///
/// Every save, list and clear is funneled through this one task, so the
/// read-modify-write cycle on the backing file never interleaves with
/// another operation in this process. Cross-process writers are not
/// coordinated; single-process deployment is assumed.
pub fn start_writer(mut job_rx: mpsc::Receiver<StoreJob>, store: ScreenshotStore) {
    tokio::spawn(async move {
        debug!("Store writer task started");
        while let Some(job) = job_rx.recv().await {
            match job {
                StoreJob::Save { request, response_tx } => {
                    debug!("Writer processing save job");
                    let result = store.save(request);
                    if let Err(e) = &result {
                        warn!("Save job failed: {}", e);
                    }
                    if response_tx.send(result).is_err() {
                        warn!("Failed to send save response - receiver dropped");
                    }
                }
                StoreJob::List { response_tx } => {
                    debug!("Writer processing list job");
                    let result = store.list();
                    if let Err(e) = &result {
                        warn!("List job failed: {}", e);
                    }
                    if response_tx.send(result).is_err() {
                        warn!("Failed to send list response - receiver dropped");
                    }
                }
                StoreJob::Clear { response_tx } => {
                    debug!("Writer processing clear job");
                    let result = store.clear();
                    if let Err(e) = &result {
                        warn!("Clear job failed: {}", e);
                    }
                    if response_tx.send(result).is_err() {
                        warn!("Failed to send clear response - receiver dropped");
                    }
                }
            }
        }
        info!("Store writer shutting down - channel closed");
    });
}
