use crate::config::MonitoredResource;
use crate::severity::Severity;
use chrono::{DateTime, Utc};

/// A finished log entry as handed to a [`LogTransport`](crate::transport::LogTransport).
///
/// Sinks map this into their own wire format; the payload has already been
/// serialized so sinks never need the builder's types.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub resource: MonitoredResource,
    pub insert_id: String,
    pub trace: Option<String>,
    pub span_id: Option<String>,
    pub payload: serde_json::Value,
}
