use crate::entry::Entry;
use crate::error::LogError;
use crate::sink::EntrySink;
use crate::transport::LogTransport;
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all entries.
///
/// Useful for measuring the overhead of building entries without any
/// external I/O, and for tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl EntrySink for NoopSink {
    async fn send_batch(&self, _entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

impl LogTransport for NoopSink {
    fn log(&self, _entry: Entry) -> Result<(), LogError> {
        Ok(())
    }
}
