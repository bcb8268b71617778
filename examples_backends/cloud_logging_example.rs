use std::sync::Arc;

use cloud_log_entry::backend::{make_sink_from_config, parse_dsn};
use cloud_log_entry::{ChannelTransport, Logger, LoggerConfig, RequestInfo, TransportConfig};

/// Ships one error entry to Cloud Logging.
///
/// Requires `CLOUD_LOG_PROJECT_ID` and `CLOUD_LOG_ACCESS_TOKEN`, e.g.
/// `CLOUD_LOG_ACCESS_TOKEN=$(gcloud auth print-access-token)`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig::from_env()?;
    let dsn = format!("cloudlogging://{}/{}", config.project_id, config.log_id);
    let sink = make_sink_from_config(&parse_dsn(&dsn)?)?;

    let (transport, handle) = ChannelTransport::new(sink, TransportConfig::default());
    let logger = Logger::new(config, Arc::new(transport));

    let id = logger.report_error(&(), &RequestInfo::new("GET", "https://example.com/"), "example error")?;
    println!("logged entry {}", id);

    drop(logger);
    handle.await?;
    Ok(())
}
