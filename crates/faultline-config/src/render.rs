use serde::Deserialize;

/// Message shown in place of server error messages
pub const DEFAULT_SERVER_MESSAGE: &str = "An internal server error occurred";

/// Content type of rendered payloads
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// How faults are turned into response payloads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Expose server error messages in payloads
    #[serde(default)]
    pub debug: bool,
    /// Replacement message for server errors when not in debug mode
    #[serde(default = "default_server_message")]
    pub server_message: String,
    /// `content-type` of the rendered body
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl RenderConfig {
    /// Default policy with debug toggled
    pub fn debug(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            debug: false,
            server_message: default_server_message(),
            content_type: default_content_type(),
        }
    }
}

fn default_server_message() -> String {
    DEFAULT_SERVER_MESSAGE.to_owned()
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_owned()
}
