use std::sync::Arc;

use crate::sink::EntrySink;

/// Supported sink kinds that can be selected via DSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    CloudLogging,
    Stdout,
    Noop,
}

/// Sink configuration parsed from a DSN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Selected sink implementation.
    pub kind: BackendKind,
    /// Raw DSN that was used to construct this config.
    pub dsn: String,
    /// Project id, for `cloudlogging://` only.
    pub project_id: Option<String>,
    /// Log id, for `cloudlogging://` only. Defaults to `app`.
    pub log_id: Option<String>,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, dsn: impl Into<String>) -> Self {
        BackendConfig { kind, dsn: dsn.into(), project_id: None, log_id: None }
    }
}

/// Parse a DSN string and infer the sink kind from its scheme.
///
/// Examples:
/// - "cloudlogging://my-project/requests"
/// - "cloudlogging://my-project" (log id `app`)
/// - "stdout://"
/// - "noop://"
pub fn parse_dsn(dsn: &str) -> Result<BackendConfig, DsnError> {
    let lower = dsn.to_ascii_lowercase();

    if lower.starts_with("cloudlogging://") {
        let rest = &dsn["cloudlogging://".len()..];
        let (project, log_id) = match rest.split_once('/') {
            Some((project, log_id)) => (project, log_id),
            None => (rest, ""),
        };
        if project.is_empty() {
            return Err(DsnError::MissingProject);
        }

        let mut config = BackendConfig::new(BackendKind::CloudLogging, dsn);
        config.project_id = Some(project.to_string());
        config.log_id = Some(if log_id.is_empty() { "app" } else { log_id }.to_string());
        Ok(config)
    } else if lower.starts_with("stdout://") {
        Ok(BackendConfig::new(BackendKind::Stdout, dsn))
    } else if lower.starts_with("noop://") {
        Ok(BackendConfig::new(BackendKind::Noop, dsn))
    } else {
        Err(DsnError::UnknownScheme)
    }
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DsnError {
    #[error("unknown or unsupported DSN scheme")]
    UnknownScheme,

    #[error("cloudlogging DSN is missing a project id")]
    MissingProject,
}

/// Error type returned when building a sink from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("http feature is not enabled")]
    HttpFeatureDisabled,

    #[error("backend config is missing {0}")]
    Incomplete(&'static str),
}

/// Create a concrete `EntrySink` implementation from a `BackendConfig`.
///
/// This is the main entry point for applications that want to select
/// a sink using a single DSN string instead of constructing sinks
/// manually.
pub fn make_sink_from_config(cfg: &BackendConfig) -> Result<Arc<dyn EntrySink>, BackendBuildError> {
    match cfg.kind {
        BackendKind::CloudLogging => {
            #[cfg(feature = "http")]
            {
                use crate::cloud_logging::{CloudLoggingConfig, CloudLoggingSink};
                use crate::config::LoggerConfig;

                let project = cfg.project_id.as_deref().ok_or(BackendBuildError::Incomplete("project id"))?;
                let mut logger_config = LoggerConfig::new(project);
                if let Some(log_id) = &cfg.log_id {
                    logger_config = logger_config.with_log_id(log_id.as_str());
                }

                let sink = CloudLoggingSink::new(CloudLoggingConfig::from_logger_config(&logger_config));
                Ok(Arc::new(sink) as Arc<dyn EntrySink>)
            }

            #[cfg(not(feature = "http"))]
            {
                let _ = cfg;
                Err(BackendBuildError::HttpFeatureDisabled)
            }
        }
        BackendKind::Stdout => Ok(Arc::new(crate::stdout::StdoutSink) as Arc<dyn EntrySink>),
        BackendKind::Noop => Ok(Arc::new(crate::noop_sink::NoopSink) as Arc<dyn EntrySink>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cloud_logging_dsn() {
        let cfg = parse_dsn("cloudlogging://my-project/requests").unwrap();
        assert_eq!(cfg.kind, BackendKind::CloudLogging);
        assert_eq!(cfg.project_id.as_deref(), Some("my-project"));
        assert_eq!(cfg.log_id.as_deref(), Some("requests"));

        let cfg = parse_dsn("CloudLogging://my-project").unwrap();
        assert_eq!(cfg.log_id.as_deref(), Some("app"));
    }

    #[test]
    fn parses_local_schemes() {
        assert_eq!(parse_dsn("stdout://").unwrap().kind, BackendKind::Stdout);
        assert_eq!(parse_dsn("noop://").unwrap().kind, BackendKind::Noop);
    }

    #[test]
    fn rejects_bad_dsns() {
        assert_eq!(parse_dsn("kafka://broker/topic").unwrap_err(), DsnError::UnknownScheme);
        assert_eq!(parse_dsn("cloudlogging:///app").unwrap_err(), DsnError::MissingProject);
    }

    #[test]
    fn builds_local_sinks() {
        assert!(make_sink_from_config(&parse_dsn("stdout://").unwrap()).is_ok());
        assert!(make_sink_from_config(&parse_dsn("noop://").unwrap()).is_ok());
    }
}
