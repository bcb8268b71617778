use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cloud_log_entry::layer::CloudLogLayer;
use cloud_log_entry::sink::EntrySink;
use cloud_log_entry::stdout::StdoutSink;
use cloud_log_entry::{
    ChannelTransport, Entry, LogError, LogTransport, Logger, LoggerConfig, RequestInfo, Severity,
    SpanContext, TransportConfig,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<Vec<Entry>>>,
    flushed: Mutex<bool>,
}

impl RecordingSink {
    fn entries(&self) -> Vec<Entry> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl EntrySink for RecordingSink {
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.batches.lock().unwrap().push(entries.to_vec());
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.flushed.lock().unwrap() = true;
        Ok(())
    }
}

/// Fails the first `failures` batches, then accepts.
struct FlakySink {
    failures: Mutex<u32>,
    inner: RecordingSink,
}

#[async_trait]
impl EntrySink for FlakySink {
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err("backend unavailable".into());
            }
        }
        self.inner.send_batch(entries).await
    }
}

/// Always fails and counts attempts.
#[derive(Default)]
struct DownSink {
    attempts: Mutex<u32>,
}

#[async_trait]
impl EntrySink for DownSink {
    async fn send_batch(&self, _entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.attempts.lock().unwrap() += 1;
        Err("backend unavailable".into())
    }
}

#[derive(Default)]
struct RecordingTransport {
    entries: Mutex<Vec<Entry>>,
}

impl LogTransport for RecordingTransport {
    fn log(&self, entry: Entry) -> Result<(), LogError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[tokio::test]
async fn channel_transport_delivers_and_flushes_on_drop() {
    let sink = Arc::new(RecordingSink::default());
    let config = TransportConfig {
        batch_size: 2,
        flush_interval: Duration::from_secs(60),
        ..TransportConfig::default()
    };
    let (transport, handle) = ChannelTransport::new(sink.clone(), config);
    let queued = Arc::clone(&transport.queued_entries);
    let delivered = Arc::clone(&transport.delivered_entries);

    let logger = Logger::new(LoggerConfig::new("proj"), Arc::new(transport));
    let mut ids = Vec::new();
    for i in 0..5 {
        let mut record = logger.create(Severity::Info);
        record.attach_request_payload_fmt(&RequestInfo::new("GET", "/"), format_args!("entry {}", i));
        ids.push(record.emit().unwrap());
    }

    drop(logger);
    handle.await.unwrap();

    let entries = sink.entries();
    let delivered_ids: Vec<_> = entries.iter().map(|e| e.insert_id.clone()).collect();
    assert_eq!(delivered_ids, ids);
    assert_eq!(entries[4].payload["message"], "entry 4");
    assert_eq!(queued.load(Ordering::Relaxed), 5);
    assert_eq!(delivered.load(Ordering::Relaxed), 5);
    assert!(*sink.flushed.lock().unwrap());
}

#[tokio::test(start_paused = true)]
async fn channel_transport_retries_failing_sink() {
    let sink = Arc::new(FlakySink {
        failures: Mutex::new(2),
        inner: RecordingSink::default(),
    });
    let (transport, handle) = ChannelTransport::new(sink.clone(), TransportConfig::default());
    let dropped = Arc::clone(&transport.dropped_entries);

    let logger = Logger::new(LoggerConfig::new("proj"), Arc::new(transport));
    logger
        .log_request(Severity::Warning, &(), &RequestInfo::new("GET", "/"), "retry me")
        .unwrap();

    drop(logger);
    handle.await.unwrap();

    let entries = sink.inner.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
}

#[tokio::test(start_paused = true)]
async fn channel_transport_drops_batch_after_max_retries() {
    let sink = Arc::new(DownSink::default());
    let config = TransportConfig {
        max_retries: 2,
        ..TransportConfig::default()
    };
    let (transport, handle) = ChannelTransport::new(sink.clone(), config);
    let delivered = Arc::clone(&transport.delivered_entries);
    let dropped = Arc::clone(&transport.dropped_entries);

    let logger = Logger::new(LoggerConfig::new("proj"), Arc::new(transport));
    logger.create(Severity::Error).emit().unwrap();

    drop(logger);
    handle.await.unwrap();

    assert_eq!(*sink.attempts.lock().unwrap(), 3);
    assert_eq!(delivered.load(Ordering::Relaxed), 0);
    assert_eq!(dropped.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn channel_transport_rejects_when_full() {
    let sink = Arc::new(RecordingSink::default());
    // Clamped up to the minimum buffer of 16.
    let config = TransportConfig {
        channel_buffer: 1,
        ..TransportConfig::default()
    };
    let (transport, handle) = ChannelTransport::new(sink.clone(), config);
    let queued = Arc::clone(&transport.queued_entries);
    let dropped = Arc::clone(&transport.dropped_entries);
    let logger = Logger::new(LoggerConfig::new("proj"), Arc::new(transport));

    // The worker cannot run until this test task yields, so nothing drains.
    let mut full = 0;
    for _ in 0..20 {
        match logger.create(Severity::Info).emit() {
            Ok(_) => {}
            Err(LogError::ChannelFull) => full += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(full, 4);
    assert_eq!(queued.load(Ordering::Relaxed), 16);
    assert_eq!(dropped.load(Ordering::Relaxed), 4);

    drop(logger);
    handle.await.unwrap();
    assert_eq!(sink.entries().len(), 16);
}

#[test]
fn stdout_sink_is_a_synchronous_transport() {
    let logger = Logger::new(LoggerConfig::new("proj"), Arc::new(StdoutSink));
    let id = logger
        .report_error(&(), &RequestInfo::new("GET", "/stdout"), "written to stdout")
        .unwrap();
    assert_eq!(id.len(), 32);
}

#[test]
fn layer_keeps_lone_trace_field_in_message() {
    let transport = Arc::new(RecordingTransport::default());
    let logger = Logger::new(LoggerConfig::new("proj"), transport.clone());

    let subscriber = Registry::default().with(CloudLogLayer::new(logger));
    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(trace_id = "abc123", "oops");
    });

    let entries = transport.entries.lock().unwrap();
    assert_eq!(entries[0].payload["message"], "oops trace_id=abc123");
    assert!(entries[0].trace.is_none());
}

#[test]
fn layer_turns_error_events_into_entries() {
    let transport = Arc::new(RecordingTransport::default());
    let logger = Logger::new(LoggerConfig::new("proj"), transport.clone());
    let layer = CloudLogLayer::new(logger);
    let emitted = Arc::clone(&layer.emitted_events);

    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("not shipped");
        tracing::error!(trace_id = "abc123", span_id = "42", user = "u-1", order = 7, "payment failed");
        tracing::error!(target: "cloud_log_entry", "internal diagnostics");
    });

    let entries = transport.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(emitted.load(Ordering::Relaxed), 1);

    let entry = &entries[0];
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(entry.trace.as_deref(), Some("projects/proj/traces/abc123"));
    assert_eq!(entry.span_id.as_deref(), Some("42"));
    assert_eq!(entry.payload["message"], "payment failed order=7");
    assert_eq!(entry.payload["context"]["user"], "u-1");
    assert_eq!(entry.payload["context"]["reportLocation"]["filePath"], file!());
}

#[test]
fn layer_respects_min_level() {
    let transport = Arc::new(RecordingTransport::default());
    let logger = Logger::new(LoggerConfig::new("proj"), transport.clone());
    let layer = CloudLogLayer::with_min_level(logger, tracing::Level::WARN);

    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("dropped");
        tracing::warn!("kept");
    });

    let entries = transport.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(entries[0].payload["message"], "kept");
    assert!(entries[0].payload["context"].get("reportLocation").is_none());
}

#[test]
fn emitted_entry_keeps_trace_from_traceparent() {
    let transport = Arc::new(RecordingTransport::default());
    let logger = Logger::new(LoggerConfig::new("proj"), transport.clone());

    let ctx = SpanContext::from_traceparent("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01");
    logger
        .log_request(Severity::Info, &ctx, &RequestInfo::new("GET", "/"), "traced")
        .unwrap();

    let entries = transport.entries.lock().unwrap();
    assert_eq!(
        entries[0].trace.as_deref(),
        Some("projects/proj/traces/0af7651916cd43dd8448eb211c80319c")
    );
    assert_eq!(entries[0].span_id.as_deref(), Some("b7ad6b7169203331"));
}
