use crate::logger::Logger;
use crate::severity::Severity;
use crate::trace::SpanContext;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Target used by this crate's own diagnostics; never forwarded.
pub const SELF_TARGET: &str = "cloud_log_entry";

/// `tracing_subscriber` layer that turns events into cloud log entries
/// through a [`Logger`].
///
/// By default only `ERROR` events are captured. Recognised event fields:
/// `message`, `trace_id` + `span_id` (trace context) and `user`. Any other
/// field is appended to the message as `key=value`. Error entries get their
/// report location from the event's callsite.
pub struct CloudLogLayer {
    logger: Logger,
    min_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Accepted by the transport.
    pub emitted_events: Arc<AtomicU64>,
    /// Rejected by the transport.
    pub failed_events: Arc<AtomicU64>,
}

impl CloudLogLayer {
    pub fn new(logger: Logger) -> Self {
        Self::with_min_level(logger, Level::ERROR)
    }

    pub fn with_min_level(logger: Logger, min_level: Level) -> Self {
        CloudLogLayer {
            logger,
            min_level,
            total_events: Arc::new(AtomicU64::new(0)),
            emitted_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S> Layer<S> for CloudLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        // More verbose levels compare greater.
        if *meta.level() > self.min_level || meta.target().starts_with(SELF_TARGET) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let severity = Severity::from(meta.level());
        let mut record = self.logger.create(severity);

        // A lone trace_id or span_id stays in the message as key=value.
        if fields.contains_key("trace_id") && fields.contains_key("span_id") {
            let trace_id = fields.remove("trace_id").unwrap_or_default();
            let span_id = fields.remove("span_id").unwrap_or_default();
            record.attach_trace_context(&SpanContext::new(trace_id, span_id));
        }
        if let Some(user) = fields.remove("user") {
            record.attach_user(user);
        }

        let mut text = message.unwrap_or_default();
        for (key, value) in &fields {
            if !text.is_empty() {
                text.push(' ');
            }
            let _ = write!(text, "{}={}", key, value);
        }
        record.attach_message(text);

        if severity.is_error() {
            if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                record.attach_report_location(file, line);
            }
        }

        match record.emit() {
            Ok(_) => self.emitted_events.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed_events.fetch_add(1, Ordering::Relaxed),
        };
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, String>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
