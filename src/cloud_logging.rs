use crate::config::{LoggerConfig, MonitoredResource};
use crate::entry::Entry;
use crate::env::CLOUD_LOG_ACCESS_TOKEN_ENV;
use crate::severity::Severity;
use crate::sink::EntrySink;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::error::Error;

pub const DEFAULT_ENDPOINT: &str = "https://logging.googleapis.com/v2/entries:write";

/// Configuration for [`CloudLoggingSink`].
#[derive(Clone, Debug)]
pub struct CloudLoggingConfig {
    /// Full URL of the `entries:write` method.
    pub endpoint: String,
    /// `projects/<project>/logs/<url-encoded log id>`.
    pub log_name: String,
    /// OAuth2 access token sent as `Authorization: Bearer`.
    pub access_token: Option<String>,
}

impl CloudLoggingConfig {
    pub fn new(log_name: impl Into<String>) -> Self {
        CloudLoggingConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            log_name: log_name.into(),
            access_token: None,
        }
    }

    /// Derive the log name from `config` and pick up the access token from
    /// `CLOUD_LOG_ACCESS_TOKEN` if set.
    pub fn from_logger_config(config: &LoggerConfig) -> Self {
        CloudLoggingConfig {
            access_token: std::env::var(CLOUD_LOG_ACCESS_TOKEN_ENV).ok().filter(|t| !t.is_empty()),
            ..CloudLoggingConfig::new(config.log_name())
        }
    }
}

/// Cloud Logging implementation of [`EntrySink`] using the REST
/// `entries:write` API.
#[derive(Clone)]
pub struct CloudLoggingSink {
    client: Client,
    config: CloudLoggingConfig,
}

impl CloudLoggingSink {
    /// Construct a new sink instance using the provided configuration.
    pub fn new(config: CloudLoggingConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    fn map_entry<'a>(&'a self, entry: &'a Entry) -> WriteEntry<'a> {
        WriteEntry {
            log_name: &self.config.log_name,
            resource: &entry.resource,
            severity: entry.severity,
            insert_id: &entry.insert_id,
            trace: entry.trace.as_deref(),
            span_id: entry.span_id.as_deref(),
            timestamp: entry.timestamp.to_rfc3339(),
            json_payload: &entry.payload,
        }
    }
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    entries: Vec<WriteEntry<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteEntry<'a> {
    log_name: &'a str,
    resource: &'a MonitoredResource,
    severity: Severity,
    insert_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span_id: Option<&'a str>,
    timestamp: String,
    json_payload: &'a serde_json::Value,
}

#[async_trait]
impl EntrySink for CloudLoggingSink {
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let body = WriteRequest {
            entries: entries.iter().map(|e| self.map_entry(e)).collect(),
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("Cloud Logging write failed with status {}: {}", status, text).into())
        }
    }
}
