use faultline_config::RenderConfig;
use faultline_core::ErrorStatus;
use http::HeaderMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The HTTP response a fault describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Response status
    pub status: ErrorStatus,
    /// JSON body
    pub payload: Payload,
    /// Response headers
    pub headers: HeaderMap,
}

impl Output {
    /// Fresh output with an empty payload and no headers
    pub fn new(status: ErrorStatus) -> Self {
        Self {
            status,
            payload: Payload::new(status),
            headers: HeaderMap::new(),
        }
    }
}

/// Body of an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub status_code: u16,
    /// Reason phrase for the status
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Authentication challenge details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<PayloadAttributes>,
    /// Caller-added fields, kept across reformatting
    ///
    /// Keys that collide with the fields above are never serialized.
    #[serde(flatten, serialize_with = "serialize_extra")]
    pub extra: Map<String, Value>,
}

const RESERVED_KEYS: [&str; 4] = ["statusCode", "error", "message", "attributes"];

fn serialize_extra<S>(extra: &Map<String, Value>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(extra.iter().filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str())))
}

impl Payload {
    fn new(status: ErrorStatus) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.reason().to_owned(),
            message: None,
            attributes: None,
            extra: Map::new(),
        }
    }

    /// Rewrite the status fields and the message according to `policy`
    ///
    /// Server errors show the policy's replacement message unless debug is
    /// enabled. Attributes and extra fields are left alone.
    pub(crate) fn reformat(&mut self, status: ErrorStatus, message: &str, policy: &RenderConfig) {
        self.status_code = status.as_u16();
        self.error = status.reason().to_owned();

        if status.is_server() && !policy.debug {
            self.message = Some(policy.server_message.clone());
        } else if !message.is_empty() {
            self.message = Some(message.to_owned());
        }
    }
}

/// `attributes` member of a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadAttributes {
    /// Opaque token of a token68 challenge
    Token(String),
    /// Challenge parameters, plus `error` when a message was given
    Params(IndexMap<String, String>),
}
