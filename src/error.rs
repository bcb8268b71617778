use std::error::Error;

/// Errors surfaced by [`LogRecord::emit`](crate::record::LogRecord::emit)
/// and the transports behind it.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to serialize log payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("log channel full, entry dropped")]
    ChannelFull,

    #[error("log channel closed")]
    ChannelClosed,

    #[error("log sink failed: {0}")]
    Sink(Box<dyn Error + Send + Sync>),

    #[error("invalid logger configuration: {0}")]
    Config(String),
}
