use std::fmt;

use faultline_config::RenderConfig;
use faultline_core::{ErrorStatus, HttpError, StatusClass};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::{BoxError, BuildError, Output};

/// An error decorated with the HTTP response it should produce
///
/// A fault carries a message, an optional wrapped source error, optional
/// structured `data`, caller decorations, and an [`Output`] holding the
/// status, JSON payload, and headers. The message is never empty: without
/// one, the status reason phrase is used.
#[derive(Debug)]
pub struct Fault {
    pub(crate) message: String,
    pub(crate) source: Option<BoxError>,
    pub(crate) data: Option<Value>,
    pub(crate) decorations: Map<String, Value>,
    pub(crate) output: Output,
    pub(crate) developer_error: bool,
    pub(crate) missing_credentials: bool,
}

impl Fault {
    /// Fault with the given status and message
    pub fn new(status: ErrorStatus, message: impl Into<String>) -> Self {
        Self::builder(status).message(message).build()
    }

    /// Fault whose message is the status reason phrase
    pub fn from_status(status: ErrorStatus) -> Self {
        Self::builder(status).build()
    }

    /// Fault from a raw status code
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is not in 400..=999
    pub fn try_new(code: u16, message: impl Into<String>) -> Result<Self, BuildError> {
        let status = ErrorStatus::from_u16(code)?;
        Ok(Self::new(status, message))
    }

    pub fn builder(status: ErrorStatus) -> FaultBuilder {
        FaultBuilder {
            status,
            message: None,
            data: None,
            decorations: Map::new(),
        }
    }

    /// Empty fault, not yet initialized
    pub(crate) fn blank(message: String, source: Option<BoxError>) -> Self {
        Self {
            message,
            source,
            data: None,
            decorations: Map::new(),
            output: Output::new(ErrorStatus::default()),
            developer_error: false,
            missing_credentials: false,
        }
    }

    /// Reset the output for `status` and fold `message` into the fault message
    ///
    /// A given message is prefixed to an existing one as `"{message}: {old}"`.
    /// Without either, the reason phrase becomes the message.
    pub(crate) fn initialize(&mut self, status: ErrorStatus, message: Option<&str>) {
        self.output = Output::new(status);

        match message.filter(|m| !m.is_empty()) {
            Some(prefix) if self.message.is_empty() => prefix.clone_into(&mut self.message),
            Some(prefix) => self.message = format!("{prefix}: {}", self.message),
            None if self.message.is_empty() => status.reason().clone_into(&mut self.message),
            None => {}
        }

        self.reformat(false);
    }

    pub(crate) fn apply_data(&mut self, data: Option<Value>, decorations: Map<String, Value>) {
        if let Some(data) = data {
            self.data = Some(data);
        }
        self.decorations.extend(decorations);
    }

    /// Rebuild `statusCode`, `error`, and `message` of the payload
    ///
    /// Server errors get a generic message unless `debug` is set.
    pub fn reformat(&mut self, debug: bool) {
        self.reformat_with(&RenderConfig::debug(debug));
    }

    /// Same as [`Fault::reformat`] with an explicit rendering policy
    pub fn reformat_with(&mut self, policy: &RenderConfig) {
        let status = self.output.status;
        self.output.payload.reformat(status, &self.message, policy);
    }

    pub fn status(&self) -> ErrorStatus {
        self.output.status
    }

    pub fn class(&self) -> StatusClass {
        self.output.status.class()
    }

    pub fn is_server(&self) -> bool {
        self.output.status.is_server()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn decoration(&self, key: &str) -> Option<&Value> {
        self.decorations.get(key)
    }

    pub const fn decorations(&self) -> &Map<String, Value> {
        &self.decorations
    }

    pub const fn output(&self) -> &Output {
        &self.output
    }

    /// Mutable output, e.g. to add payload fields
    ///
    /// Call [`Fault::reformat`] after changing the status.
    pub const fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Raised by [`Fault::bad_implementation`]
    pub const fn is_developer_error(&self) -> bool {
        self.developer_error
    }

    /// A challenge was issued without an error message, i.e. credentials
    /// were absent rather than wrong
    pub const fn is_missing_credentials(&self) -> bool {
        self.missing_credentials
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.output.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Attach caller state that survives re-wrapping
    #[must_use]
    pub fn decorate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.decorations.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

impl HttpError for Fault {
    fn status(&self) -> ErrorStatus {
        self.output.status
    }

    fn headers(&self) -> HeaderMap {
        self.output.headers.clone()
    }
}

/// Builder for [`Fault`]
#[derive(Debug, Clone)]
pub struct FaultBuilder {
    status: ErrorStatus,
    message: Option<String>,
    data: Option<Value>,
    decorations: Map<String, Value>,
}

impl FaultBuilder {
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn decorate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.decorations.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Fault {
        let mut fault = Fault::blank(String::new(), None);
        fault.apply_data(self.data, self.decorations);
        fault.initialize(self.status, self.message.as_deref());
        fault
    }
}
