use crate::entry::Entry;
use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for [`Entry`]s drained by a
/// [`ChannelTransport`](crate::transport::ChannelTransport).
///
/// Implementations are responsible for moving entries to a concrete
/// backend (Cloud Logging, stdout, etc). The transport calls `send_batch`
/// from a background task and never awaits it on the application thread.
#[async_trait]
pub trait EntrySink: Send + Sync {
    /// Send a batch of entries to the underlying backend.
    ///
    /// **Parameters**
    /// - `entries`: one or more finished [`Entry`]s, in emission order.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the whole batch.
    /// - `Err(..)` if the backend failed (network error, serialization
    ///   error, HTTP status, etc.). The transport treats this as a
    ///   transient failure and retries the batch with backoff.
    async fn send_batch(&self, entries: &[Entry]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered entries, if the backend implements buffering.
    ///
    /// Called once when the transport shuts down. Default implementation
    /// is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
