use crate::config::LoggerConfig;
use crate::error::LogError;
use crate::record::LogRecord;
use crate::request::RequestInfo;
use crate::severity::Severity;
use crate::trace::TraceContext;
use crate::transport::LogTransport;
use std::sync::Arc;

/// Factory for [`LogRecord`]s sharing one configuration and transport.
///
/// Cheap to clone; clones share the same `Arc`s.
#[derive(Clone)]
pub struct Logger {
    config: Arc<LoggerConfig>,
    transport: Arc<dyn LogTransport>,
}

impl Logger {
    pub fn new(config: LoggerConfig, transport: Arc<dyn LogTransport>) -> Self {
        Logger { config: Arc::new(config), transport }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Start a new record at `severity`.
    pub fn create(&self, severity: Severity) -> LogRecord {
        LogRecord::new(Arc::clone(&self.config), Arc::clone(&self.transport), severity)
    }

    /// Log a request-scoped message with trace context.
    pub fn log_request<C: TraceContext + ?Sized>(
        &self,
        severity: Severity,
        ctx: &C,
        request: &RequestInfo,
        message: impl Into<String>,
    ) -> Result<String, LogError> {
        let mut record = self.create(severity);
        record.attach_trace_context(ctx).attach_request_payload(request, message);
        record.emit()
    }

    /// Report an error at the caller's location, with a stack trace.
    ///
    /// Returns the entry's insertion id so it can be shown to the end user
    /// as a support reference next to a generic error message.
    #[track_caller]
    pub fn report_error<C: TraceContext + ?Sized>(
        &self,
        ctx: &C,
        request: &RequestInfo,
        message: impl Into<String>,
    ) -> Result<String, LogError> {
        let mut record = self.create(Severity::Error);
        record
            .attach_trace_context(ctx)
            .attach_request_payload(request, message)
            .attach_error_location()
            .attach_stack_trace();
        record.emit()
    }
}
