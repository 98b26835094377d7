use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Default capacity for the writer job queue
pub const QUEUE_SIZE: usize = 100;

/// Configuration for the API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// File holding the persisted screenshot collection
    pub data_file: PathBuf,

    /// Capacity of the writer job queue
    pub queue_size: usize,

    /// Timeout for API requests
    pub request_timeout: Duration,

    /// Origin allowed to call the API cross-origin (None allows any)
    pub allowed_origin: Option<String>,

    /// When the server started, for uptime reporting
    pub started: Instant,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/screenshots.json"),
            queue_size: QUEUE_SIZE,
            request_timeout: Duration::from_secs(30),
            allowed_origin: None,
            started: Instant::now(),
        }
    }
}
