use crate::entry::Entry;
use crate::error::LogError;
use crate::sink::EntrySink;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

/// Synchronous hand-off point between a [`LogRecord`](crate::record::LogRecord)
/// and whatever delivers it.
///
/// `log` either accepts the entry or fails; buffering, batching, retries
/// and authentication are the implementation's business.
pub trait LogTransport: Send + Sync {
    fn log(&self, entry: Entry) -> Result<(), LogError>;
}

/// Buffering and retry settings for [`ChannelTransport`].
///
/// **Fields**
/// - `channel_buffer`: maximum number of queued [`Entry`]s before new
///   entries are rejected with [`LogError::ChannelFull`].
/// - `batch_size`: number of entries handed to the sink at once.
/// - `flush_interval`: upper bound on how long an incomplete batch waits.
/// - `max_retries`: attempts after the first failure before a batch is
///   dropped.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub max_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            max_retries: 5,
        }
    }
}

/// [`LogTransport`] that queues entries on a bounded channel and forwards
/// them to an [`EntrySink`] from a background Tokio task.
///
/// `log` never blocks. When the last clone of the transport is dropped the
/// task drains the channel, sends what is left, flushes the sink and exits.
pub struct ChannelTransport {
    sender: mpsc::Sender<Entry>,
    /// Accepted into the channel.
    pub queued_entries: Arc<AtomicU64>,
    /// Acknowledged by the sink.
    pub delivered_entries: Arc<AtomicU64>,
    /// Rejected because the channel was full, or given up on after retries.
    pub dropped_entries: Arc<AtomicU64>,
}

impl ChannelTransport {
    /// Create a transport and spawn its delivery task on the current Tokio
    /// runtime.
    ///
    /// Minimal thresholds are enforced for `channel_buffer`, `batch_size`
    /// and `flush_interval` to avoid degenerate configurations.
    pub fn new(sink: Arc<dyn EntrySink>, config: TransportConfig) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));
        let max_retries = config.max_retries;

        let (tx, mut rx) = mpsc::channel::<Entry>(buffer);

        let queued_entries = Arc::new(AtomicU64::new(0));
        let delivered_entries = Arc::new(AtomicU64::new(0));
        let dropped_entries = Arc::new(AtomicU64::new(0));

        let delivered_bg = Arc::clone(&delivered_entries);
        let dropped_bg = Arc::clone(&dropped_entries);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    maybe_entry = rx.recv() => match maybe_entry {
                        Some(entry) => {
                            batch.push(entry);
                            if batch.len() >= batch_size {
                                deliver(&*sink, &mut batch, max_retries, &delivered_bg, &dropped_bg).await;
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            deliver(&*sink, &mut batch, max_retries, &delivered_bg, &dropped_bg).await;
                        }
                    }
                }
            }

            if !batch.is_empty() {
                deliver(&*sink, &mut batch, max_retries, &delivered_bg, &dropped_bg).await;
            }
            if let Err(e) = sink.flush().await {
                tracing::warn!(target: "cloud_log_entry", error = %e, "log sink flush failed");
            }
        });

        (
            Self {
                sender: tx,
                queued_entries,
                delivered_entries,
                dropped_entries,
            },
            handle,
        )
    }
}

impl LogTransport for ChannelTransport {
    fn log(&self, entry: Entry) -> Result<(), LogError> {
        match self.sender.try_send(entry) {
            Ok(()) => {
                self.queued_entries.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_entries.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(target: "cloud_log_entry", "log channel full, dropping entry");
                Err(LogError::ChannelFull)
            }
            Err(TrySendError::Closed(_)) => Err(LogError::ChannelClosed),
        }
    }
}

async fn deliver(
    sink: &dyn EntrySink,
    batch: &mut Vec<Entry>,
    max_retries: u32,
    delivered: &AtomicU64,
    dropped: &AtomicU64,
) {
    let count = batch.len() as u64;
    match send_with_backoff(sink, batch, max_retries).await {
        Ok(()) => {
            delivered.fetch_add(count, Ordering::Relaxed);
        }
        Err(e) => {
            dropped.fetch_add(count, Ordering::Relaxed);
            tracing::warn!(target: "cloud_log_entry", error = %e, dropped = count, "giving up on log batch");
        }
    }
    batch.clear();
}

async fn send_with_backoff(
    sink: &dyn EntrySink,
    batch: &[Entry],
    max_retries: u32,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut backoff = Duration::from_millis(100);
    let max_backoff = Duration::from_secs(10);
    let mut attempt = 0;

    loop {
        match sink.send_batch(batch).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= max_retries => return Err(e),
            Err(e) => {
                attempt += 1;
                tracing::warn!(
                    target: "cloud_log_entry",
                    error = %e,
                    attempt,
                    "log sink send failed, retrying in {:?}",
                    backoff
                );
                sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
            }
        }
    }
}
