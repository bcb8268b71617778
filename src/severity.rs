use serde::Serialize;
use std::fmt;
use tracing::Level;

/// Cloud Logging severity levels, in increasing order of importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Default,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "DEFAULT",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    /// `true` for `ERROR` and everything above it.
    pub fn is_error(&self) -> bool {
        *self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Level> for Severity {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            // Cloud Logging has nothing finer than DEBUG.
            Level::DEBUG | Level::TRACE => Severity::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(serde_json::to_string(&Severity::Emergency).unwrap(), "\"EMERGENCY\"");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(Severity::from(&Level::ERROR), Severity::Error);
        assert_eq!(Severity::from(&Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(&Level::TRACE), Severity::Debug);
        assert!(Severity::Alert.is_error());
        assert!(!Severity::Warning.is_error());
    }
}
