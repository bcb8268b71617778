//! Trace context providers.
//!
//! A [`TraceContext`] is anything that may carry an active span. Records only
//! copy the trace and span ids out of it; span creation, sampling and
//! propagation stay with the tracing library.

/// Trace and span identifiers of an active span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    pub trace_id: String,
    pub span_id: String,
}

impl SpanContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        SpanContext { trace_id: trace_id.into(), span_id: span_id.into() }
    }

    /// A trace id must be non-empty hex and not all zeros; a span id must be
    /// non-empty.
    pub fn is_valid(&self) -> bool {
        !self.trace_id.is_empty()
            && self.trace_id.bytes().all(|b| b.is_ascii_hexdigit())
            && self.trace_id.bytes().any(|b| b != b'0')
            && !self.span_id.is_empty()
    }

    /// Parse a W3C `traceparent` header: `00-<trace-id>-<span-id>-<flags>`.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let _version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let _flags = parts.next()?;

        if trace_id.len() != 32 || span_id.len() != 16 {
            return None;
        }
        let ctx = SpanContext::new(trace_id.to_ascii_lowercase(), span_id.to_ascii_lowercase());
        ctx.is_valid().then_some(ctx)
    }

    /// Parse Google's `X-Cloud-Trace-Context` header: `TRACE_ID/SPAN_ID;o=1`.
    ///
    /// The span id in this header is decimal; it is re-encoded as 16 hex
    /// digits, which is what log entries expect.
    pub fn from_cloud_trace_header(header: &str) -> Option<Self> {
        let (trace_id, rest) = header.trim().split_once('/')?;
        let span = rest.split(';').next()?;
        let span: u64 = span.parse().ok()?;

        let ctx = SpanContext::new(trace_id.to_ascii_lowercase(), format!("{:016x}", span));
        ctx.is_valid().then_some(ctx)
    }
}

/// An execution context that may carry an active span.
pub trait TraceContext {
    fn span_context(&self) -> Option<SpanContext>;
}

/// No context at all.
impl TraceContext for () {
    fn span_context(&self) -> Option<SpanContext> {
        None
    }
}

impl TraceContext for SpanContext {
    fn span_context(&self) -> Option<SpanContext> {
        Some(self.clone())
    }
}

impl TraceContext for Option<SpanContext> {
    fn span_context(&self) -> Option<SpanContext> {
        self.clone()
    }
}

impl<T: TraceContext + ?Sized> TraceContext for &T {
    fn span_context(&self) -> Option<SpanContext> {
        (**self).span_context()
    }
}

#[cfg(feature = "otel")]
impl TraceContext for opentelemetry::Context {
    fn span_context(&self) -> Option<SpanContext> {
        use opentelemetry::trace::TraceContextExt;

        let span = self.span();
        let sc = span.span_context();
        if !sc.is_valid() {
            return None;
        }
        Some(SpanContext::new(sc.trace_id().to_string(), sc.span_id().to_string()))
    }
}
