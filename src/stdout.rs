use crate::entry::Entry;
use crate::error::LogError;
use crate::sink::EntrySink;
use crate::transport::LogTransport;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::error::Error;
use std::io::Write;

pub const INSERT_ID_KEY: &str = "logging.googleapis.com/insertId";
pub const TRACE_KEY: &str = "logging.googleapis.com/trace";
pub const SPAN_ID_KEY: &str = "logging.googleapis.com/spanId";

const REPORTED_ERROR_EVENT: &str =
    "type.googleapis.com/google.devtools.clouderrorreporting.v1beta1.ReportedErrorEvent";

/// Writes each entry as one JSON line on stdout, in the structured logging
/// format the Cloud Run and GKE logging agents parse.
///
/// Usable both as a synchronous [`LogTransport`] and as an [`EntrySink`]
/// behind a [`ChannelTransport`](crate::transport::ChannelTransport).
#[derive(Clone, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Render `entry` as a single JSON line without the trailing newline.
    ///
    /// Payload fields are flattened to the top level next to the special
    /// `severity` and `logging.googleapis.com/*` keys. Error entries that
    /// carry a report location are tagged as `ReportedErrorEvent`.
    pub fn format_line(entry: &Entry) -> Result<String, serde_json::Error> {
        let mut line = match &entry.payload {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("message".to_string(), other.clone());
                map
            }
        };

        line.insert("severity".to_string(), serde_json::to_value(entry.severity)?);
        line.insert("timestamp".to_string(), Value::String(entry.timestamp.to_rfc3339()));
        line.insert(INSERT_ID_KEY.to_string(), Value::String(entry.insert_id.clone()));
        if let Some(trace) = &entry.trace {
            line.insert(TRACE_KEY.to_string(), Value::String(trace.clone()));
        }
        if let Some(span_id) = &entry.span_id {
            line.insert(SPAN_ID_KEY.to_string(), Value::String(span_id.clone()));
        }

        let located = entry.payload.pointer("/context/reportLocation").is_some();
        if entry.severity.is_error() && located {
            line.insert("@type".to_string(), Value::String(REPORTED_ERROR_EVENT.to_string()));
        }

        serde_json::to_string(&Value::Object(line))
    }

    fn write_lines(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for entry in entries {
            let line = Self::format_line(entry)?;
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl LogTransport for StdoutSink {
    fn log(&self, entry: Entry) -> Result<(), LogError> {
        self.write_lines(std::slice::from_ref(&entry))
            .map_err(LogError::Sink)
    }
}

#[async_trait]
impl EntrySink for StdoutSink {
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.write_lines(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitoredResource;
    use crate::severity::Severity;
    use chrono::Utc;
    use serde_json::json;

    fn entry(severity: Severity, payload: Value) -> Entry {
        Entry {
            timestamp: Utc::now(),
            severity,
            resource: MonitoredResource::new("global"),
            insert_id: "id-1".into(),
            trace: Some("projects/p/traces/t".into()),
            span_id: None,
            payload,
        }
    }

    #[test]
    fn flattens_payload_with_special_keys() {
        let line = StdoutSink::format_line(&entry(Severity::Info, json!({"message": "hi"}))).unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["message"], "hi");
        assert_eq!(value["severity"], "INFO");
        assert_eq!(value[INSERT_ID_KEY], "id-1");
        assert_eq!(value[TRACE_KEY], "projects/p/traces/t");
        assert!(value.get(SPAN_ID_KEY).is_none());
        assert!(value.get("@type").is_none());
        assert!(!line.contains('\n'));
    }

    #[test]
    fn located_errors_are_reported_error_events() {
        let payload = json!({
            "message": "boom",
            "context": {"reportLocation": {"filePath": "a.rs", "lineNumber": 1, "functionName": "<unknown>"}}
        });
        let line = StdoutSink::format_line(&entry(Severity::Error, payload)).unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["@type"], REPORTED_ERROR_EVENT);
    }
}
