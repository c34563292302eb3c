use std::fmt;
use std::str::FromStr;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Coarse category of an error status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 400..=499, the caller did something wrong
    Client,
    /// 500 and above, the server failed
    Server,
}

/// Status code rejected by [`ErrorStatus`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStatus {
    /// Input could not be parsed as a status code at all
    #[error("not a status code: {0:?}")]
    Malformed(String),

    /// A valid status code that does not describe an error
    #[error("{0} is not an error status (expected 400-999)")]
    NotAnError(u16),
}

/// An HTTP status code in the 400..=999 range
///
/// Codes are not checked against any registry: 499 or 799 are accepted and
/// simply have no canonical reason phrase.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ErrorStatus(StatusCode);

macro_rules! error_status_constants {
    ($($name:ident,)+) => {
        $(
            pub const $name: Self = Self(StatusCode::$name);
        )+
    };
}

impl ErrorStatus {
    error_status_constants! {
        BAD_REQUEST,
        UNAUTHORIZED,
        PAYMENT_REQUIRED,
        FORBIDDEN,
        NOT_FOUND,
        METHOD_NOT_ALLOWED,
        NOT_ACCEPTABLE,
        PROXY_AUTHENTICATION_REQUIRED,
        REQUEST_TIMEOUT,
        CONFLICT,
        GONE,
        PRECONDITION_FAILED,
        PAYLOAD_TOO_LARGE,
        UNSUPPORTED_MEDIA_TYPE,
        IM_A_TEAPOT,
        UNPROCESSABLE_ENTITY,
        TOO_MANY_REQUESTS,
        INTERNAL_SERVER_ERROR,
        NOT_IMPLEMENTED,
        BAD_GATEWAY,
        SERVICE_UNAVAILABLE,
        GATEWAY_TIMEOUT,
    }

    /// Validate a raw status code
    pub fn from_u16(code: u16) -> Result<Self, InvalidStatus> {
        if code < 400 {
            return Err(InvalidStatus::NotAnError(code));
        }

        StatusCode::from_u16(code)
            .map(Self)
            .map_err(|_| InvalidStatus::NotAnError(code))
    }

    /// Validate an existing [`StatusCode`]
    pub fn from_status(status: StatusCode) -> Result<Self, InvalidStatus> {
        if status.as_u16() < 400 {
            return Err(InvalidStatus::NotAnError(status.as_u16()));
        }

        Ok(Self(status))
    }

    pub const fn as_status(self) -> StatusCode {
        self.0
    }

    pub fn as_u16(self) -> u16 {
        self.0.as_u16()
    }

    /// Client or server category
    pub fn class(self) -> StatusClass {
        if self.as_u16() >= 500 {
            StatusClass::Server
        } else {
            StatusClass::Client
        }
    }

    pub fn is_server(self) -> bool {
        self.class() == StatusClass::Server
    }

    pub fn is_client(self) -> bool {
        self.class() == StatusClass::Client
    }

    /// Canonical reason phrase, `"Unknown"` for unregistered codes
    pub fn reason(self) -> &'static str {
        self.0.canonical_reason().unwrap_or("Unknown")
    }
}

impl Default for ErrorStatus {
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl fmt::Debug for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

impl TryFrom<u16> for ErrorStatus {
    type Error = InvalidStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_u16(code)
    }
}

impl TryFrom<StatusCode> for ErrorStatus {
    type Error = InvalidStatus;

    fn try_from(status: StatusCode) -> Result<Self, Self::Error> {
        Self::from_status(status)
    }
}

impl FromStr for ErrorStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .parse::<u16>()
            .map_err(|_| InvalidStatus::Malformed(s.to_owned()))?;
        Self::from_u16(code)
    }
}

impl From<ErrorStatus> for StatusCode {
    fn from(status: ErrorStatus) -> Self {
        status.0
    }
}

impl From<ErrorStatus> for u16 {
    fn from(status: ErrorStatus) -> Self {
        status.as_u16()
    }
}

impl PartialEq<u16> for ErrorStatus {
    fn eq(&self, other: &u16) -> bool {
        self.as_u16() == *other
    }
}

impl PartialEq<StatusCode> for ErrorStatus {
    fn eq(&self, other: &StatusCode) -> bool {
        self.0 == *other
    }
}
