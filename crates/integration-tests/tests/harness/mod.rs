//! Helpers shared by the integration tests

#![allow(dead_code)]

use faultline_config::RenderConfig;
use faultline_fault::Fault;
use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// A rendered fault split into its parts
pub struct Rendered {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Rendered {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Render with the default policy
pub fn render(fault: &Fault) -> Rendered {
    render_with(fault, &RenderConfig::default())
}

/// Render with an explicit policy
pub fn render_with(fault: &Fault, policy: &RenderConfig) -> Rendered {
    let (parts, body) = fault.to_response_with(policy).into_parts();

    Rendered {
        status: parts.status,
        headers: parts.headers,
        body: serde_json::from_str(&body).expect("payload must be JSON"),
    }
}
