use serde::Serialize;

/// JSON body of a cloud log entry, in the shape Error Reporting expects.
///
/// Every field is optional and skipped when empty, so a record that was never
/// enriched serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_context: Option<ServiceContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "ErrorContext::is_empty")]
    pub context: ErrorContext,
}

/// Name and version of the emitting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceContext {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl ServiceContext {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        ServiceContext { service: service.into(), version: version.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.service.is_empty() && self.version.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "HttpRequest::is_empty")]
    pub http_request: HttpRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_location: Option<ReportLocation>,
}

impl ErrorContext {
    pub fn is_empty(&self) -> bool {
        self.http_request.is_empty() && self.user.is_none() && self.report_location.is_none()
    }
}

/// Snapshot of the HTTP request being served when the entry was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
}

impl HttpRequest {
    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.url.is_none()
            && self.user_agent.is_none()
            && self.referrer.is_none()
            && self.response_status_code.is_none()
            && self.remote_ip.is_none()
    }
}

/// Source coordinates attributed to an error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLocation {
    pub file_path: String,
    pub line_number: u32,
    pub function_name: String,
}
