/// The parts of an inbound HTTP request that end up in a log entry.
///
/// Framework-agnostic: build it from whatever request type the application
/// uses. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    pub url: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub remote_ip: Option<String>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        RequestInfo { method: method.into(), url: url.into(), ..Default::default() }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_remote_ip(mut self, remote_ip: impl Into<String>) -> Self {
        self.remote_ip = Some(remote_ip.into());
        self
    }
}
