use std::any::Any;
use std::mem;

use faultline_core::{ErrorStatus, HttpError};
use serde_json::{Map, Value};

use crate::{BoxError, Fault};

/// How [`Fault::wrap`] decorates an error
#[derive(Debug, Default, Clone)]
pub struct WrapOptions {
    status: Option<ErrorStatus>,
    message: Option<String>,
    data: Option<Value>,
    decorations: Map<String, Value>,
    preserve: bool,
}

impl WrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status for the fault (500 when wrapping a plain error)
    #[must_use]
    pub fn status(mut self, status: ErrorStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Prefix for the error message
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

    /// Leave the status and message of an existing fault untouched
    ///
    /// Data and decorations are still applied.
    #[must_use]
    pub fn preserve(mut self) -> Self {
        self.preserve = true;
        self
    }

    pub(crate) fn message_opt(mut self, message: Option<&str>) -> Self {
        self.message = message.map(str::to_owned);
        self
    }
}

impl Fault {
    /// Decorate any error as a fault
    ///
    /// A plain error becomes the source of a new fault and lends it its
    /// message. An error that already is a fault is updated in place; see
    /// [`Fault::rewrap`]. A fault carried by an `anyhow::Error` counts as a
    /// fault.
    pub fn wrap<E>(error: E, options: WrapOptions) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        match into_box_error(error).downcast::<Self>() {
            Ok(fault) => (*fault).rewrap(options),
            Err(other) => Self::from_boxed(other, options),
        }
    }

    /// Same as [`Fault::wrap`] for an `anyhow` error
    pub fn wrap_anyhow(error: anyhow::Error, options: WrapOptions) -> Self {
        Self::wrap(error, options)
    }

    /// Fault for a domain error, carrying its status and headers
    ///
    /// A fault is returned as is.
    pub fn from_http_error<E>(error: E) -> Self
    where
        E: HttpError + Send + Sync + 'static,
    {
        let status = error.status();
        let headers = error.headers();

        let boxed: BoxError = Box::new(error);
        match boxed.downcast::<Self>() {
            Ok(fault) => *fault,
            Err(other) => {
                let mut fault = Self::from_boxed(other, WrapOptions::new().status(status));
                fault.output.headers.extend(headers);
                fault
            }
        }
    }

    /// Apply wrap options to an existing fault
    ///
    /// Data and decorations are always merged. Unless `preserve` was set,
    /// a new status or message re-initializes the fault: the output is
    /// rebuilt for the status and the message is prefixed. With neither,
    /// the fault is returned as is.
    #[must_use]
    pub fn rewrap(mut self, options: WrapOptions) -> Self {
        let WrapOptions {
            status,
            message,
            data,
            decorations,
            preserve,
        } = options;

        self.apply_data(data, decorations);

        let message = message.filter(|m| !m.is_empty());
        if preserve || (status.is_none() && message.is_none()) {
            return self;
        }

        let status = status.unwrap_or(self.output.status);
        tracing::debug!(
            from = self.output.status.as_u16(),
            to = status.as_u16(),
            "re-initializing fault"
        );

        self.initialize(status, message.as_deref());
        self
    }

    pub(crate) fn from_boxed(error: BoxError, options: WrapOptions) -> Self {
        let WrapOptions {
            status,
            message,
            data,
            decorations,
            ..
        } = options;
        let status = status.unwrap_or_default();

        tracing::debug!(status = status.as_u16(), error = %error, "wrapping error as fault");

        let mut fault = Self::blank(error.to_string(), Some(error));
        fault.apply_data(data, decorations);
        fault.initialize(status, message.as_deref());
        fault
    }

    /// Whether `error` is a fault, optionally with a given status
    pub fn is_fault(error: &(dyn std::error::Error + 'static), status: Option<ErrorStatus>) -> bool {
        error
            .downcast_ref::<Self>()
            .is_some_and(|fault| status.is_none_or(|s| fault.status() == s))
    }

    /// First fault in the source chain of `error`, starting with `error`
    pub fn find<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a Self> {
        std::iter::successors(Some(error), |e| e.source()).find_map(|e| e.downcast_ref::<Self>())
    }
}

/// Box `error`, taking a fault out of an `anyhow::Error`
///
/// `anyhow` converts into a box around its own private wrapper, which hides
/// the fault from `downcast`.
pub(crate) fn into_box_error<E>(mut error: E) -> BoxError
where
    E: Into<BoxError> + 'static,
{
    if let Some(slot) = (&mut error as &mut dyn Any).downcast_mut::<anyhow::Error>() {
        let anyhow = mem::replace(slot, anyhow::Error::msg(""));
        return match anyhow.downcast::<Fault>() {
            Ok(fault) => Box::new(fault),
            Err(other) => other.into(),
        };
    }
    error.into()
}

/// Turn the error of a `Result` into a fault
pub trait ResultExt<T> {
    /// Wrap the error with `status`
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is `Err`
    fn or_fault(self, status: ErrorStatus) -> Result<T, Fault>;

    /// Wrap the error with explicit options
    ///
    /// # Errors
    ///
    /// Returns the wrapped error if `self` is `Err`
    fn or_fault_with(self, options: WrapOptions) -> Result<T, Fault>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError> + 'static,
{
    fn or_fault(self, status: ErrorStatus) -> Result<T, Fault> {
        self.or_fault_with(WrapOptions::new().status(status))
    }

    fn or_fault_with(self, options: WrapOptions) -> Result<T, Fault> {
        self.map_err(|e| Fault::wrap(e, options))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use http::header::RETRY_AFTER;
    use http::{HeaderMap, HeaderValue};
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_error_defaults_to_500() {
        let err = io::Error::other("disk full");
        let fault = Fault::wrap(err, WrapOptions::new());

        assert_eq!(fault.status(), ErrorStatus::INTERNAL_SERVER_ERROR);
        assert_eq!(fault.message(), "disk full");
        assert_eq!(
            fault.output().payload.message.as_deref(),
            Some("An internal server error occurred")
        );
        assert_eq!(fault.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn plain_error_with_status_and_prefix() {
        let err = io::Error::new(io::ErrorKind::NotFound, "no such key");
        let fault = Fault::wrap(
            err,
            WrapOptions::new().status(ErrorStatus::NOT_FOUND).message("lookup failed"),
        );

        assert_eq!(fault.message(), "lookup failed: no such key");
        assert_eq!(
            fault.output().payload.message.as_deref(),
            Some("lookup failed: no such key")
        );
        assert!(fault.source().unwrap().downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn plain_error_without_message_uses_reason() {
        let fault = Fault::wrap("", WrapOptions::new().status(ErrorStatus::GONE));
        assert_eq!(fault.message(), "Gone");
    }

    #[test]
    fn wrapping_a_fault_without_options_is_idempotent() {
        let original = Fault::new(ErrorStatus::NOT_FOUND, "no user 42").with_header(
            RETRY_AFTER,
            HeaderValue::from_static("5"),
        );

        let fault = Fault::wrap(original, WrapOptions::new());

        assert_eq!(fault.status(), ErrorStatus::NOT_FOUND);
        assert_eq!(fault.message(), "no user 42");
        assert_eq!(fault.output().headers.get(RETRY_AFTER).unwrap(), "5");
        assert!(fault.source().is_none());
    }

    #[test]
    fn wrapping_a_fault_keeps_caller_state() {
        let original = Fault::builder(ErrorStatus::BAD_REQUEST)
            .message("bad input")
            .data(json!({ "field": "email" }))
            .decorate("trace", "t-1")
            .build();

        let fault = Fault::wrap(
            original,
            WrapOptions::new()
                .status(ErrorStatus::UNPROCESSABLE_ENTITY)
                .message("validation")
                .decorate("attempt", 2),
        );

        assert_eq!(fault.status(), ErrorStatus::UNPROCESSABLE_ENTITY);
        assert_eq!(fault.message(), "validation: bad input");
        assert_eq!(fault.data(), Some(&json!({ "field": "email" })));
        assert_eq!(fault.decoration("trace"), Some(&json!("t-1")));
        assert_eq!(fault.decoration("attempt"), Some(&json!(2)));
    }

    #[test]
    fn message_only_keeps_existing_status() {
        let original = Fault::new(ErrorStatus::FORBIDDEN, "denied");
        let fault = Fault::wrap(original, WrapOptions::new().message("admin area"));

        assert_eq!(fault.status(), ErrorStatus::FORBIDDEN);
        assert_eq!(fault.message(), "admin area: denied");
    }

    #[test]
    fn reinitializing_resets_headers() {
        let original =
            Fault::from_status(ErrorStatus::TOO_MANY_REQUESTS).with_header(RETRY_AFTER, HeaderValue::from_static("1"));

        let fault = Fault::wrap(original, WrapOptions::new().status(ErrorStatus::SERVICE_UNAVAILABLE));

        assert!(fault.output().headers.is_empty());
        assert_eq!(fault.output().payload.status_code, 503);
    }

    #[test]
    fn preserve_only_applies_data() {
        let original = Fault::new(ErrorStatus::CONFLICT, "taken");
        let fault = Fault::wrap(
            original,
            WrapOptions::new()
                .status(ErrorStatus::INTERNAL_SERVER_ERROR)
                .message("ignored")
                .data(7)
                .preserve(),
        );

        assert_eq!(fault.status(), ErrorStatus::CONFLICT);
        assert_eq!(fault.message(), "taken");
        assert_eq!(fault.data(), Some(&json!(7)));
    }

    #[test]
    fn data_is_kept_when_not_replaced() {
        let original = Fault::from_status(ErrorStatus::NOT_FOUND).with_data("first");
        let fault = Fault::wrap(original, WrapOptions::new().status(ErrorStatus::GONE));
        assert_eq!(fault.data(), Some(&json!("first")));
    }

    #[test]
    fn anyhow_faults_are_unwrapped() {
        let err = anyhow::Error::new(Fault::new(ErrorStatus::PAYMENT_REQUIRED, "trial ended"));
        let fault = Fault::wrap_anyhow(err, WrapOptions::new());

        assert_eq!(fault.status(), ErrorStatus::PAYMENT_REQUIRED);
        assert_eq!(fault.message(), "trial ended");
    }

    #[test]
    fn anyhow_faults_are_recognized_by_wrap() {
        let err = anyhow::Error::new(Fault::new(ErrorStatus::CONFLICT, "already shipped").decorate("trace", "t-1"));
        let fault = Fault::wrap(err, WrapOptions::new());

        assert_eq!(fault.status(), ErrorStatus::CONFLICT);
        assert_eq!(fault.message(), "already shipped");
        assert_eq!(fault.decoration("trace"), Some(&json!("t-1")));
        assert!(fault.source().is_none());
    }

    #[test]
    fn anyhow_result_keeps_fault_state() {
        let result: anyhow::Result<()> = Err(anyhow::Error::new(
            Fault::new(ErrorStatus::NOT_FOUND, "no user")
                .with_header(RETRY_AFTER, HeaderValue::from_static("3"))
                .decorate("trace", "t-1"),
        ));

        let fault = result.or_fault_with(WrapOptions::new().decorate("layer", "api")).unwrap_err();

        assert_eq!(fault.status(), ErrorStatus::NOT_FOUND);
        assert_eq!(fault.message(), "no user");
        assert_eq!(fault.output().headers.get(RETRY_AFTER).unwrap(), "3");
        assert_eq!(fault.decoration("trace"), Some(&json!("t-1")));
        assert_eq!(fault.decoration("layer"), Some(&json!("api")));
    }

    #[test]
    fn anyhow_plain_errors_through_result_ext() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("pool exhausted"));
        let fault = result.or_fault(ErrorStatus::SERVICE_UNAVAILABLE).unwrap_err();

        assert_eq!(fault.status(), ErrorStatus::SERVICE_UNAVAILABLE);
        assert_eq!(fault.message(), "pool exhausted");
        assert_eq!(fault.source().unwrap().to_string(), "pool exhausted");
    }

    #[test]
    fn anyhow_plain_errors_are_wrapped() {
        let err = anyhow::anyhow!("socket closed");
        let fault = Fault::wrap_anyhow(err, WrapOptions::new().status(ErrorStatus::BAD_GATEWAY));

        assert_eq!(fault.status(), ErrorStatus::BAD_GATEWAY);
        assert_eq!(fault.message(), "socket closed");
        assert!(fault.source().is_some());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("quota exceeded")]
    struct QuotaExceeded;

    impl HttpError for QuotaExceeded {
        fn status(&self) -> ErrorStatus {
            ErrorStatus::TOO_MANY_REQUESTS
        }

        fn headers(&self) -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert(RETRY_AFTER, HeaderValue::from_static("60"));
            headers
        }
    }

    #[test]
    fn http_errors_carry_status_and_headers() {
        let fault = Fault::from_http_error(QuotaExceeded);

        assert_eq!(fault.status(), ErrorStatus::TOO_MANY_REQUESTS);
        assert_eq!(fault.message(), "quota exceeded");
        assert_eq!(fault.output().headers.get(RETRY_AFTER).unwrap(), "60");
        assert!(fault.source().unwrap().is::<QuotaExceeded>());
    }

    #[test]
    fn http_error_that_is_a_fault_is_untouched() {
        let challenge = faultline_core::Challenge::new("Bearer").param("realm", "api");
        let original = Fault::unauthorized_challenge(None, challenge)
            .unwrap()
            .decorate("trace", "t-2");
        let expected = original.output().clone();

        let fault = Fault::from_http_error(original);

        assert_eq!(fault.output(), &expected);
        assert_eq!(
            serde_json::to_value(&fault.output().payload.attributes).unwrap(),
            json!({ "realm": "api" })
        );
        assert!(fault.is_missing_credentials());
        assert_eq!(fault.decoration("trace"), Some(&json!("t-2")));
        assert!(fault.source().is_none());
    }

    #[test]
    fn is_fault_checks_status() {
        let fault = Fault::from_status(ErrorStatus::NOT_FOUND);
        assert!(Fault::is_fault(&fault, None));
        assert!(Fault::is_fault(&fault, Some(ErrorStatus::NOT_FOUND)));
        assert!(!Fault::is_fault(&fault, Some(ErrorStatus::GONE)));

        let other = io::Error::other("nope");
        assert!(!Fault::is_fault(&other, None));
    }

    #[test]
    fn find_walks_the_source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("handler failed")]
        struct HandlerError(#[source] Fault);

        let err = HandlerError(Fault::new(ErrorStatus::FORBIDDEN, "no access"));
        let fault = Fault::find(&err).unwrap();
        assert_eq!(fault.status(), ErrorStatus::FORBIDDEN);

        assert!(Fault::find(&io::Error::other("plain")).is_none());
    }

    #[test]
    fn result_ext_wraps_errors() {
        let result: Result<(), io::Error> = Err(io::Error::other("timeout"));
        let fault = result.or_fault(ErrorStatus::GATEWAY_TIMEOUT).unwrap_err();
        assert_eq!(fault.status(), ErrorStatus::GATEWAY_TIMEOUT);

        let ok: Result<u8, io::Error> = Ok(1);
        assert_eq!(ok.or_fault(ErrorStatus::BAD_REQUEST).unwrap(), 1);

        let parsed = "x".parse::<u32>().or_fault_with(
            WrapOptions::new().status(ErrorStatus::BAD_REQUEST).message("invalid id"),
        );
        assert_eq!(parsed.unwrap_err().message(), "invalid id: invalid digit found in string");
    }
}
