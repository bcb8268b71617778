use crate::layer::CloudLogLayer;
use crate::logger::Logger;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Configuration of the global subscriber installed by
/// [`init_tracing_with_config`].
///
/// **Fields**
/// - `min_level`: least severe level that is shipped as a cloud log entry.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to [`CloudLogLayer`] so events are also printed locally.
/// - `filter`: `EnvFilter` directives; when `None`, `RUST_LOG` is used and
///   falls back to `info`.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub enable_stdout: bool,
    pub filter: Option<String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::ERROR,
            enable_stdout: true,
            filter: None,
        }
    }
}

/// Install a global `tracing` subscriber that forwards events to `logger`.
///
/// **Effects**
///
/// Installs `Registry + EnvFilter + CloudLogLayer` (plus `fmt` when
/// `enable_stdout` is set) as the global default subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(logger: Logger, config: LayerConfig) -> Result<(), SetGlobalDefaultError> {
    let filter = match &config.filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let layer = CloudLogLayer::with_min_level(logger, config.min_level);

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(filter).with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(filter).with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn init_tracing(logger: Logger) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
