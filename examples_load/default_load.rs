use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use cloud_log_entry::noop_sink::NoopSink;
use cloud_log_entry::{
    ChannelTransport, Logger, LoggerConfig, RequestInfo, Severity, SpanContext, TransportConfig,
};

#[tokio::main]
async fn main() {
    let (transport, handle) = ChannelTransport::new(Arc::new(NoopSink), TransportConfig::default());
    let dropped = Arc::clone(&transport.dropped_entries);
    let delivered = Arc::clone(&transport.delivered_entries);
    let logger = Logger::new(LoggerConfig::new("load-test"), Arc::new(transport));

    let request = RequestInfo::new("GET", "https://example.com/load").with_user_agent("load/1.0");
    let span = SpanContext::new("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7");

    let n: u64 = 100_000;
    let mut rejected: u64 = 0;
    let start = Instant::now();

    for i in 0..n {
        let mut record = logger.create(Severity::Error);
        record
            .attach_trace_context(&span)
            .attach_request_payload_fmt(&request, format_args!("default load test error {}", i))
            .attach_error_location();
        if record.emit().is_err() {
            rejected += 1;
        }
    }

    let elapsed = start.elapsed();
    println!("default config: built {} entries in {:?} (~{:.0} entries/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Dropping the logger closes the channel; the worker drains and exits.
    drop(logger);
    let _ = handle.await;
    // `dropped` also counts batches the sink gave up on, so it can exceed
    // the entries rejected at emit time.
    println!(
        "rejected at emit: {}, delivered: {}, dropped: {}",
        rejected,
        delivered.load(Ordering::Relaxed),
        dropped.load(Ordering::Relaxed)
    );
}
