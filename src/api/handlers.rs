use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use crate::api::config::ApiConfig;
use crate::api::models::{ClearResponse, ErrorResponse, HealthStatus, SaveResponse, StoreJob};
use crate::store::{SaveRequest, StoreError};

/// HTTP handler for saving a screenshot capture
///
/// Enqueues the save on the writer queue and awaits the result with a
/// timeout. Validation failures come back as 400 with a message naming the
/// offending field; storage failures as 500.
#[instrument(skip(request, config, job_tx), fields(robot_id = ?request.robot_id))]
pub async fn save_screenshot(
    request: web::Json<SaveRequest>,
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<StoreJob>>,
) -> impl Responder {
    info!("Received save request for robot {:?}", request.robot_id);

    let request = request.into_inner();
    match submit(&config, &job_tx, |tx| StoreJob::Save {
        request,
        response_tx: tx,
    })
    .await
    {
        Ok(record) => {
            info!("Save request completed, assigned id {}", record.id);
            HttpResponse::Ok().json(SaveResponse {
                success: true,
                id: record.id,
            })
        }
        Err(response) => response,
    }
}

/// HTTP handler returning all stored captures, newest first
#[instrument(skip(config, job_tx))]
pub async fn list_screenshots(
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<StoreJob>>,
) -> impl Responder {
    debug!("Received list request");

    match submit(&config, &job_tx, |tx| StoreJob::List { response_tx: tx }).await {
        Ok(records) => {
            info!("Returning {} stored screenshots", records.len());
            HttpResponse::Ok().json(records)
        }
        Err(response) => response,
    }
}

/// HTTP handler that irreversibly removes every stored capture
#[instrument(skip(config, job_tx))]
pub async fn clear_screenshots(
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<StoreJob>>,
) -> impl Responder {
    info!("Received clear request");

    match submit(&config, &job_tx, |tx| StoreJob::Clear { response_tx: tx }).await {
        Ok(removed) => HttpResponse::Ok().json(ClearResponse {
            success: true,
            message: format!("Cleared {} stored screenshots", removed),
        }),
        Err(response) => response,
    }
}

/// Health check endpoint for monitoring service status
///
/// Reports writer queue occupancy and uptime; unhealthy means the writer
/// task is gone and no mutation can succeed.
#[instrument(skip(config, job_tx))]
pub async fn health_check(
    config: web::Data<ApiConfig>,
    job_tx: web::Data<mpsc::Sender<StoreJob>>,
) -> impl Responder {
    debug!("Processing health check request");

    let capacity = job_tx.capacity();
    let queued = config.queue_size.saturating_sub(capacity);
    let status = if job_tx.is_closed() {
        warn!("Health check: writer queue is closed");
        "unhealthy"
    } else if capacity == 0 {
        "degraded"
    } else {
        "healthy"
    };

    info!("Health check: status={}, queued={}/{}", status, queued, config.queue_size);
    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        queued_jobs: queued,
        queue_capacity: config.queue_size,
        uptime_secs: config.started.elapsed().as_secs(),
    })
}

/// Enqueues a job for the writer task and awaits its reply.
///
/// Returns the store result on success, or the HTTP response to send when
/// the queue is full, the writer is gone, the operation failed, or the
/// timeout elapsed.
async fn submit<T>(
    config: &ApiConfig,
    job_tx: &mpsc::Sender<StoreJob>,
    build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreJob,
) -> Result<T, HttpResponse> {
    let (response_tx, response_rx) = oneshot::channel();
    let job = build(response_tx);

    debug!("Attempting to enqueue store job");
    if let Err(e) = job_tx.try_send(job) {
        return Err(match e {
            mpsc::error::TrySendError::Full(_) => {
                warn!("Writer queue full, rejecting request");
                HttpResponse::TooManyRequests().json(ErrorResponse {
                    error: "Server is busy, try again later.".to_string(),
                })
            }
            mpsc::error::TrySendError::Closed(_) => {
                error!("Writer queue has been closed!");
                HttpResponse::ServiceUnavailable().json(ErrorResponse {
                    error: "Service is shutting down or unavailable.".to_string(),
                })
            }
        });
    }

    debug!("Job enqueued, waiting for result with timeout: {:?}", config.request_timeout);
    match timeout(config.request_timeout, response_rx).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(e))) => Err(rejection(e)),
        Ok(Err(_)) => {
            error!("Writer dropped the response channel unexpectedly");
            Err(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Writer dropped.".to_string(),
            }))
        }
        Err(_) => {
            error!("Store operation timed out after {:?}", config.request_timeout);
            Err(HttpResponse::RequestTimeout().json(ErrorResponse {
                error: "Request timed out.".to_string(),
            }))
        }
    }
}

/// Keeps malformed request bodies (invalid JSON, wrong field types) on the
/// same `{"error": ...}` wire shape as store-level validation failures.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    warn!("Rejected malformed request body: {}", message);
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse { error: message }),
    )
    .into()
}

fn rejection(e: StoreError) -> HttpResponse {
    match e {
        StoreError::Validation { .. } => {
            warn!("Rejected save request: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse { error: e.to_string() })
        }
        StoreError::Io(_) => {
            error!("Store operation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse { error: e.to_string() })
        }
    }
}
