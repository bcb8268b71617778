pub mod config;
pub mod entry;
pub mod env;
pub mod error;
pub mod payload;
pub mod record;
pub mod request;
pub mod severity;
pub mod trace;

pub mod logger;
pub mod transport;
pub mod sink;
pub mod backend;
pub mod layer;

#[cfg(feature = "http")]
pub mod cloud_logging;

pub mod init;
pub mod noop_sink;
pub mod stdout;

pub use config::{LoggerConfig, MonitoredResource};
pub use entry::Entry;
pub use error::LogError;
pub use logger::Logger;
pub use record::LogRecord;
pub use request::RequestInfo;
pub use severity::Severity;
pub use trace::{SpanContext, TraceContext};
pub use transport::{ChannelTransport, LogTransport, TransportConfig};
