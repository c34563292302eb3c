use http::HeaderValue;
use indexmap::IndexMap;

/// Errors raised while synthesizing protocol headers
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// Attribute contains characters outside printable ASCII
    #[error("header attribute contains invalid characters: {0:?}")]
    InvalidAttribute(String),

    /// Authentication scheme is not an HTTP token
    #[error("invalid authentication scheme: {0:?}")]
    InvalidScheme(String),

    /// Challenge parameter name is not an HTTP token
    #[error("invalid challenge parameter name: {0:?}")]
    InvalidParamName(String),

    /// Method name is not an HTTP token
    #[error("invalid method: {0:?}")]
    InvalidMethod(String),

    /// The assembled value was rejected by `http`
    #[error("invalid header value: {0}")]
    InvalidValue(#[from] http::header::InvalidHeaderValue),
}

/// Escape a value for use inside a quoted header attribute
///
/// Only printable ASCII is accepted. Backslashes and double quotes are
/// escaped with a backslash.
pub fn escape_header_attribute(attribute: &str) -> Result<String, HeaderError> {
    if !attribute.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(HeaderError::InvalidAttribute(attribute.to_owned()));
    }

    let mut escaped = String::with_capacity(attribute.len());
    for c in attribute.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Ok(escaped)
}

/// RFC 9110 `token`
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Parameters attached to a single authentication scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeParams {
    /// Opaque token written after the scheme, e.g. `Negotiate abc==`
    Token68(String),
    /// Ordered `name="value"` pairs
    Params(IndexMap<String, String>),
}

/// One authentication scheme with optional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    scheme: String,
    params: Option<ChallengeParams>,
}

impl Challenge {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            params: None,
        }
    }

    /// Replace any parameters with an opaque token
    #[must_use]
    pub fn token68(mut self, token: impl Into<String>) -> Self {
        self.params = Some(ChallengeParams::Token68(token.into()));
        self
    }

    /// Append a `name="value"` parameter
    ///
    /// A previously set token is discarded.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.params {
            Some(ChallengeParams::Params(map)) => {
                map.insert(name.into(), value.into());
            }
            _ => {
                let mut map = IndexMap::new();
                map.insert(name.into(), value.into());
                self.params = Some(ChallengeParams::Params(map));
            }
        }
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub const fn params(&self) -> Option<&ChallengeParams> {
        self.params.as_ref()
    }

    /// Build the header value, appending `error="..."` when given
    pub fn header_value(&self, error: Option<&str>) -> Result<HeaderValue, HeaderError> {
        if !is_token(&self.scheme) {
            return Err(HeaderError::InvalidScheme(self.scheme.clone()));
        }

        let mut value = self.scheme.clone();
        let mut wrote_params = false;

        match &self.params {
            None => {}
            Some(ChallengeParams::Token68(token)) => {
                value.push(' ');
                value.push_str(&escape_header_attribute(token)?);
                wrote_params = true;
            }
            Some(ChallengeParams::Params(map)) if !map.is_empty() => {
                let pairs = map
                    .iter()
                    .map(|(name, val)| {
                        if !is_token(name) {
                            return Err(HeaderError::InvalidParamName(name.clone()));
                        }
                        Ok(format!("{name}=\"{}\"", escape_header_attribute(val)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                value.push(' ');
                value.push_str(&pairs.join(", "));
                wrote_params = true;
            }
            Some(ChallengeParams::Params(_)) => {}
        }

        if let Some(error) = error {
            if wrote_params {
                value.push(',');
            }
            value.push_str(" error=\"");
            value.push_str(&escape_header_attribute(error)?);
            value.push('"');
        }

        Ok(HeaderValue::from_str(&value)?)
    }
}

/// What a `WWW-Authenticate` or `Proxy-Authenticate` header advertises
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChallenge {
    /// Several bare schemes, no parameters and no error
    Schemes(Vec<String>),
    /// A single scheme with optional parameters
    Single(Challenge),
}

impl AuthChallenge {
    pub fn schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Schemes(schemes.into_iter().map(Into::into).collect())
    }

    /// Build the header value
    ///
    /// The error message only applies to a single scheme.
    pub fn header_value(&self, error: Option<&str>) -> Result<HeaderValue, HeaderError> {
        match self {
            Self::Schemes(schemes) => {
                if let Some(bad) = schemes.iter().find(|s| !is_token(s)) {
                    return Err(HeaderError::InvalidScheme(bad.clone()));
                }
                Ok(HeaderValue::from_str(&schemes.join(", "))?)
            }
            Self::Single(challenge) => challenge.header_value(error),
        }
    }
}

impl From<Challenge> for AuthChallenge {
    fn from(challenge: Challenge) -> Self {
        Self::Single(challenge)
    }
}

/// Build an `Allow` header value from method names
///
/// An empty list produces an empty value, meaning no method is allowed.
pub fn allow_header<I, S>(methods: I) -> Result<HeaderValue, HeaderError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let methods = methods
        .into_iter()
        .map(|m| {
            let m = m.as_ref();
            if is_token(m) {
                Ok(m.to_owned())
            } else {
                Err(HeaderError::InvalidMethod(m.to_owned()))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HeaderValue::from_str(&methods.join(", "))?)
}
