use crate::config::LoggerConfig;
use crate::entry::Entry;
use crate::error::LogError;
use crate::payload::{Payload, ReportLocation};
use crate::request::RequestInfo;
use crate::severity::Severity;
use crate::trace::TraceContext;
use crate::transport::LogTransport;
use chrono::Utc;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use uuid::Uuid;

/// Function name recorded in every report location. Symbol names are not
/// resolved.
pub const UNKNOWN_FUNCTION: &str = "<unknown>";

/// One log record under construction.
///
/// Created by [`Logger::create`](crate::logger::Logger::create), enriched
/// through the `attach_*` methods in any order, and finally consumed by
/// [`emit`](LogRecord::emit). The severity is fixed at creation.
pub struct LogRecord {
    config: Arc<LoggerConfig>,
    transport: Arc<dyn LogTransport>,
    severity: Severity,
    trace: Option<String>,
    span_id: Option<String>,
    payload: Payload,
}

impl LogRecord {
    pub(crate) fn new(
        config: Arc<LoggerConfig>,
        transport: Arc<dyn LogTransport>,
        severity: Severity,
    ) -> Self {
        LogRecord {
            config,
            transport,
            severity,
            trace: None,
            span_id: None,
            payload: Payload::default(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Copy trace and span ids from `ctx` if it carries a valid active span.
    /// Otherwise the record is left untouched.
    pub fn attach_trace_context<C: TraceContext + ?Sized>(&mut self, ctx: &C) -> &mut Self {
        if let Some(span) = ctx.span_context().filter(|s| s.is_valid()) {
            self.trace = Some(self.config.trace_name(&span.trace_id));
            self.span_id = Some(span.span_id);
        }
        self
    }

    /// Set the message and stamp the service descriptor.
    pub fn attach_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.payload.message = Some(message.into());
        self.payload.service_context = Some(self.config.service.clone()).filter(|s| !s.is_empty());
        self
    }

    /// Set the message and describe the HTTP request being served.
    pub fn attach_request_payload(
        &mut self,
        request: &RequestInfo,
        message: impl Into<String>,
    ) -> &mut Self {
        self.attach_message(message);

        let http = &mut self.payload.context.http_request;
        http.method = non_empty(&request.method);
        http.url = non_empty(&request.url);
        http.user_agent = request.user_agent.as_deref().and_then(non_empty);
        http.referrer = request.referrer.as_deref().and_then(non_empty);
        http.remote_ip = request.remote_ip.as_deref().and_then(non_empty);
        self
    }

    /// Like [`attach_request_payload`](Self::attach_request_payload) with a
    /// message rendered from `format_args!`.
    pub fn attach_request_payload_fmt(
        &mut self,
        request: &RequestInfo,
        args: fmt::Arguments<'_>,
    ) -> &mut Self {
        self.attach_request_payload(request, args.to_string())
    }

    /// Record the caller's source location as the report location.
    ///
    /// Wrappers that should be transparent here must be `#[track_caller]`
    /// themselves.
    #[track_caller]
    pub fn attach_error_location(&mut self) -> &mut Self {
        let caller = Location::caller();
        self.attach_report_location(caller.file(), caller.line())
    }

    pub fn attach_report_location(&mut self, file: &str, line: u32) -> &mut Self {
        self.payload.context.report_location = Some(ReportLocation {
            file_path: file.to_string(),
            line_number: line,
            function_name: UNKNOWN_FUNCTION.to_string(),
        });
        self
    }

    /// Append a freshly captured stack trace to the message.
    pub fn attach_stack_trace(&mut self) -> &mut Self {
        let backtrace = Backtrace::force_capture();
        let message = self.payload.message.take().unwrap_or_default();
        self.payload.message = Some(format!("{}\n{}", message, backtrace));
        self
    }

    pub fn attach_user(&mut self, user: impl Into<String>) -> &mut Self {
        let user = user.into();
        if !user.is_empty() {
            self.payload.context.user = Some(user);
        }
        self
    }

    pub fn attach_response_status(&mut self, status: u16) -> &mut Self {
        if status != 0 {
            self.payload.context.http_request.response_status_code = Some(status);
        }
        self
    }

    /// Hand the record to the transport.
    ///
    /// **Returns**
    /// - `Ok(insert_id)`: the fresh insertion id, usable as a support
    ///   reference in user-facing error responses.
    /// - `Err(..)`: the payload failed to serialize or the transport
    ///   rejected the entry. Transport errors are passed through unchanged.
    pub fn emit(self) -> Result<String, LogError> {
        let insert_id = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_value(&self.payload)?;

        let entry = Entry {
            timestamp: Utc::now(),
            severity: self.severity,
            resource: self.config.resource.clone(),
            insert_id: insert_id.clone(),
            trace: self.trace,
            span_id: self.span_id,
            payload,
        };

        tracing::debug!(
            target: "cloud_log_entry",
            insert_id = %entry.insert_id,
            severity = %entry.severity,
            "emitting log entry"
        );
        self.transport.log(entry)?;
        Ok(insert_id)
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("severity", &self.severity)
            .field("trace", &self.trace)
            .field("span_id", &self.span_id)
            .field("payload", &self.payload)
            .finish()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
