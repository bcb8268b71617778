use std::sync::Arc;

use async_trait::async_trait;
use cloud_log_entry::{
    init::init_tracing, sink::EntrySink, ChannelTransport, Entry, Logger, LoggerConfig,
    RequestInfo, SpanContext, TransportConfig,
};
use tracing::{error, info};

/// Example of integrating a completely custom backend by implementing
/// the `EntrySink` trait directly. Imagine this talks to some
/// proprietary log store for which this crate does not provide a
/// built-in sink.
struct MyCustomStoreSink;

#[async_trait]
impl EntrySink for MyCustomStoreSink {
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Here you would call your own client library for the target store.
        // For the sake of example we just print the entries.
        for entry in entries {
            println!("[my-custom-store] {} {} {}", entry.severity, entry.insert_id, entry.payload);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let (transport, _handle) = ChannelTransport::new(Arc::new(MyCustomStoreSink), TransportConfig::default());
    let logger = Logger::new(LoggerConfig::new("demo-project"), Arc::new(transport));

    let support_id = logger
        .report_error(
            &SpanContext::new("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7"),
            &RequestInfo::new("POST", "https://shop.example.com/checkout"),
            "payment provider timed out",
        )
        .unwrap_or_else(|e| format!("<not logged: {}>", e));
    println!("support reference: {}", support_id);

    init_tracing(logger).expect("install subscriber");
    info!("custom backend example started");
    error!(user = "u-42", "simulated error sent via custom backend");

    // The global subscriber keeps the transport alive, so wait for the
    // periodic flush instead of joining the worker.
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
}
