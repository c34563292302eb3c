use faultline_config::{DEFAULT_CONTENT_TYPE, RenderConfig};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response};

use crate::{Fault, Payload};

impl Fault {
    /// Payload as it would be rendered under `policy`
    ///
    /// The fault itself is not modified.
    pub fn payload_with(&self, policy: &RenderConfig) -> Payload {
        let mut payload = self.output.payload.clone();
        payload.reformat(self.output.status, &self.message, policy);
        payload
    }

    /// Response with the default rendering policy
    pub fn to_response(&self) -> Response<String> {
        self.to_response_with(&RenderConfig::default())
    }

    /// Response carrying the status, headers, and JSON payload
    pub fn to_response_with(&self, policy: &RenderConfig) -> Response<String> {
        let payload = self.payload_with(policy);
        let body = serde_json::to_string(&payload).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize fault payload");
            String::new()
        });

        let content_type = HeaderValue::from_str(&policy.content_type).unwrap_or_else(|e| {
            tracing::warn!(
                content_type = %policy.content_type,
                error = %e,
                "invalid content type, using default"
            );
            HeaderValue::from_static(DEFAULT_CONTENT_TYPE)
        });

        let mut response = Response::new(body);
        *response.status_mut() = self.output.status.as_status();

        let headers = response.headers_mut();
        headers.extend(self.output.headers.clone());
        headers.insert(CONTENT_TYPE, content_type);

        response
    }
}

impl From<Fault> for Response<String> {
    fn from(fault: Fault) -> Self {
        fault.to_response()
    }
}
