use http::HeaderMap;

use crate::ErrorStatus;

/// Trait for domain errors that know which HTTP response they map to
///
/// Implemented by application error types. A fault built from such an error
/// takes its status and headers, keeping the domain error decoupled from any
/// particular web framework.
pub trait HttpError: std::error::Error {
    /// HTTP status for this error
    fn status(&self) -> ErrorStatus;

    /// Extra response headers (e.g. `Retry-After`)
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}
