/// Environment variable names read by [`LoggerConfig::from_env`].
///
/// These are purely helpers; the logger itself remains decoupled from
/// environment access.
///
/// [`LoggerConfig::from_env`]: crate::config::LoggerConfig::from_env

/// Google Cloud project that owns the log and the traces. Required.
pub const CLOUD_LOG_PROJECT_ID_ENV: &str = "CLOUD_LOG_PROJECT_ID";

/// Log id inside the project, e.g. `app` or `requests`.
pub const CLOUD_LOG_ID_ENV: &str = "CLOUD_LOG_ID";

/// Service name reported in `serviceContext`.
pub const CLOUD_LOG_SERVICE_ENV: &str = "CLOUD_LOG_SERVICE";

/// Service version reported in `serviceContext`.
pub const CLOUD_LOG_SERVICE_VERSION_ENV: &str = "CLOUD_LOG_SERVICE_VERSION";

/// Monitored resource type, e.g. `global` or `cloud_run_revision`.
pub const CLOUD_LOG_RESOURCE_TYPE_ENV: &str = "CLOUD_LOG_RESOURCE_TYPE";

/// OAuth2 access token for the Cloud Logging API.
pub const CLOUD_LOG_ACCESS_TOKEN_ENV: &str = "CLOUD_LOG_ACCESS_TOKEN";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
