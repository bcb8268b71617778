use crate::env::{
    env_or, CLOUD_LOG_ID_ENV, CLOUD_LOG_PROJECT_ID_ENV, CLOUD_LOG_RESOURCE_TYPE_ENV,
    CLOUD_LOG_SERVICE_ENV, CLOUD_LOG_SERVICE_VERSION_ENV,
};
use crate::error::LogError;
use crate::payload::ServiceContext;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_LOG_ID: &str = "app";
pub const DEFAULT_SERVICE: &str = "reactor";
pub const DEFAULT_SERVICE_VERSION: &str = "1";
pub const DEFAULT_RESOURCE_TYPE: &str = "global";

/// The monitored resource every entry of this process is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl MonitoredResource {
    pub fn new(kind: impl Into<String>) -> Self {
        MonitoredResource { kind: kind.into(), labels: BTreeMap::new() }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Process-wide, read-only logger settings.
///
/// Built once at startup and shared behind an `Arc` by every record the
/// process creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub project_id: String,
    pub log_id: String,
    pub service: ServiceContext,
    pub resource: MonitoredResource,
}

impl LoggerConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        LoggerConfig {
            project_id: project_id.into(),
            log_id: DEFAULT_LOG_ID.to_string(),
            service: ServiceContext::new(DEFAULT_SERVICE, DEFAULT_SERVICE_VERSION),
            resource: MonitoredResource::new(DEFAULT_RESOURCE_TYPE),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>, version: impl Into<String>) -> Self {
        self.service = ServiceContext::new(service, version);
        self
    }

    pub fn with_resource(mut self, resource: MonitoredResource) -> Self {
        self.resource = resource;
        self
    }

    pub fn with_log_id(mut self, log_id: impl Into<String>) -> Self {
        self.log_id = log_id.into();
        self
    }

    /// Build a configuration from the `CLOUD_LOG_*` environment variables.
    ///
    /// **Returns**
    /// - `Err(LogError::Config)` if `CLOUD_LOG_PROJECT_ID` is unset or empty.
    pub fn from_env() -> Result<Self, LogError> {
        let project_id = env_or(CLOUD_LOG_PROJECT_ID_ENV, "").trim().to_string();
        if project_id.is_empty() {
            return Err(LogError::Config(format!("{} is not set", CLOUD_LOG_PROJECT_ID_ENV)));
        }

        Ok(LoggerConfig {
            project_id,
            log_id: env_or(CLOUD_LOG_ID_ENV, DEFAULT_LOG_ID),
            service: ServiceContext::new(
                env_or(CLOUD_LOG_SERVICE_ENV, DEFAULT_SERVICE),
                env_or(CLOUD_LOG_SERVICE_VERSION_ENV, DEFAULT_SERVICE_VERSION),
            ),
            resource: MonitoredResource::new(env_or(CLOUD_LOG_RESOURCE_TYPE_ENV, DEFAULT_RESOURCE_TYPE)),
        })
    }

    /// Fully qualified trace name, `projects/<project>/traces/<trace_id>`.
    pub fn trace_name(&self, trace_id: &str) -> String {
        format!("projects/{}/traces/{}", self.project_id, trace_id)
    }

    /// Fully qualified log name; the log id must be URL-encoded.
    pub fn log_name(&self) -> String {
        format!("projects/{}/logs/{}", self.project_id, urlencoding::encode(&self.log_id))
    }
}
