use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use screenshot_store::api::config::{ApiConfig, QUEUE_SIZE};
use screenshot_store::api::start_server;
use screenshot_store::utils::logger::init_logger;

/// Screenshot store service for the inspection dashboard
#[derive(Debug, Parser)]
#[command(name = "screenshot_store")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// File holding the persisted screenshot collection
    #[arg(long, default_value = "data/screenshots.json")]
    data_file: PathBuf,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    /// Origin allowed to call the API cross-origin (defaults to any)
    #[arg(long)]
    allowed_origin: Option<String>,

    /// Seconds before an in-flight request is abandoned
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let _ = init_logger(&args.log_dir);

    let config = ApiConfig {
        data_file: args.data_file,
        queue_size: QUEUE_SIZE,
        request_timeout: Duration::from_secs(args.request_timeout),
        allowed_origin: args.allowed_origin,
        started: Instant::now(),
    };

    // Start server
    start_server(&args.host, args.port, Some(config)).await?;

    Ok(())
}
