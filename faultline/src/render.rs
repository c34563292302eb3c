use std::fmt::Write as _;

use faultline_core::ErrorStatus;
use http::Response;

/// Status line, headers, blank line, pretty-printed body
pub fn format_response(response: &Response<String>) -> String {
    // same reason phrases as the payload, including "Unknown"
    let status = ErrorStatus::from_status(response.status())
        .map_or_else(|_| response.status().to_string(), |status| status.to_string());
    let mut out = format!("HTTP/1.1 {status}\n");

    for (name, value) in response.headers() {
        let _ = writeln!(out, "{name}: {}", String::from_utf8_lossy(value.as_bytes()));
    }
    out.push('\n');

    match serde_json::from_str::<serde_json::Value>(response.body())
        .and_then(|body| serde_json::to_string_pretty(&body))
    {
        Ok(pretty) => out.push_str(&pretty),
        Err(_) => out.push_str(response.body()),
    }

    out
}
