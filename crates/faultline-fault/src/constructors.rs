use std::time::Duration;

use faultline_core::headers::allow_header;
use faultline_core::{AuthChallenge, ChallengeParams, ErrorStatus};
use http::header::{ALLOW, PROXY_AUTHENTICATE, RETRY_AFTER, WWW_AUTHENTICATE};
use http::{HeaderName, HeaderValue};
use indexmap::IndexMap;

use crate::wrap::into_box_error;
use crate::{BoxError, BuildError, Fault, PayloadAttributes, WrapOptions};

impl Fault {
    fn with_optional_message(status: ErrorStatus, message: Option<&str>) -> Self {
        let mut builder = Self::builder(status);
        if let Some(message) = message {
            builder = builder.message(message);
        }
        builder.build()
    }

    /// 401 without an authentication challenge
    pub fn unauthorized(message: Option<&str>) -> Self {
        Self::with_optional_message(ErrorStatus::UNAUTHORIZED, message)
    }

    /// 401 with a `WWW-Authenticate` header
    ///
    /// For a single scheme the payload gets an `attributes` member holding the
    /// challenge parameters and the error message. Without a message the
    /// fault is flagged as missing credentials.
    pub fn unauthorized_challenge(
        message: Option<&str>,
        challenge: impl Into<AuthChallenge>,
    ) -> Result<Self, BuildError> {
        Self::challenge(ErrorStatus::UNAUTHORIZED, WWW_AUTHENTICATE, message, &challenge.into())
    }

    /// 407 with a `Proxy-Authenticate` header, same rules as
    /// [`Fault::unauthorized_challenge`]
    pub fn proxy_authentication_required(
        message: Option<&str>,
        challenge: impl Into<AuthChallenge>,
    ) -> Result<Self, BuildError> {
        Self::challenge(
            ErrorStatus::PROXY_AUTHENTICATION_REQUIRED,
            PROXY_AUTHENTICATE,
            message,
            &challenge.into(),
        )
    }

    fn challenge(
        status: ErrorStatus,
        header: HeaderName,
        message: Option<&str>,
        challenge: &AuthChallenge,
    ) -> Result<Self, BuildError> {
        let message = message.filter(|m| !m.is_empty());
        let value = challenge.header_value(message)?;

        let mut fault = Self::with_optional_message(status, message);

        if let AuthChallenge::Single(challenge) = challenge {
            fault.output.payload.attributes = match challenge.params() {
                Some(ChallengeParams::Token68(token)) => Some(PayloadAttributes::Token(token.clone())),
                Some(ChallengeParams::Params(params)) => {
                    let mut attributes = params.clone();
                    if let Some(message) = message {
                        attributes.insert("error".to_owned(), message.to_owned());
                    }
                    Some(PayloadAttributes::Params(attributes))
                }
                None => message.map(|message| {
                    let mut attributes = IndexMap::new();
                    attributes.insert("error".to_owned(), message.to_owned());
                    PayloadAttributes::Params(attributes)
                }),
            };
            fault.missing_credentials = message.is_none();
        }

        fault.output.headers.insert(header, value);
        Ok(fault)
    }

    /// 405 with an `Allow` header listing the supported methods
    pub fn method_not_allowed<I, S>(message: Option<&str>, allow: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let value = allow_header(allow)?;
        let mut fault = Self::with_optional_message(ErrorStatus::METHOD_NOT_ALLOWED, message);
        fault.output.headers.insert(ALLOW, value);
        Ok(fault)
    }

    /// 429 with an optional `Retry-After` header
    pub fn too_many_requests(message: Option<&str>, retry_after: Option<Duration>) -> Self {
        Self::with_optional_message(ErrorStatus::TOO_MANY_REQUESTS, message).with_retry_after(retry_after)
    }

    /// 503 with an optional `Retry-After` header
    pub fn service_unavailable(message: Option<&str>, retry_after: Option<Duration>) -> Self {
        Self::with_optional_message(ErrorStatus::SERVICE_UNAVAILABLE, message).with_retry_after(retry_after)
    }

    fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        if let Some(delay) = retry_after {
            // delay-seconds, rounded up
            let seconds = delay.as_secs().saturating_add(u64::from(delay.subsec_nanos() > 0));
            self.output.headers.insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        self
    }

    /// 500
    pub fn internal(message: Option<&str>) -> Self {
        Self::with_optional_message(ErrorStatus::INTERNAL_SERVER_ERROR, message)
    }

    /// 500 caused by `error`
    ///
    /// A plain error is wrapped with `message` as prefix. An existing fault is
    /// kept intact as the source of a new 500.
    pub fn internal_from<E>(message: Option<&str>, error: E) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        match into_box_error(error).downcast::<Self>() {
            Ok(fault) => {
                let mut outer = Self::internal(message);
                outer.source = Some(fault as BoxError);
                outer
            }
            Err(other) => Self::from_boxed(
                other,
                WrapOptions::new()
                    .status(ErrorStatus::INTERNAL_SERVER_ERROR)
                    .message_opt(message),
            ),
        }
    }

    /// 500 flagged as a developer error
    pub fn bad_implementation(message: Option<&str>) -> Self {
        let mut fault = Self::internal(message);
        fault.developer_error = true;
        fault
    }

    /// [`Fault::internal_from`] flagged as a developer error
    pub fn bad_implementation_from<E>(message: Option<&str>, error: E) -> Self
    where
        E: Into<BoxError> + 'static,
    {
        let mut fault = Self::internal_from(message, error);
        fault.developer_error = true;
        fault
    }
}
