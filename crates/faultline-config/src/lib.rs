#![allow(clippy::must_use_candidate)]

mod loader;
pub mod render;

use serde::Deserialize;

pub use render::{DEFAULT_CONTENT_TYPE, DEFAULT_SERVER_MESSAGE, RenderConfig};

/// Top-level faultline configuration
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Payload rendering policy
    #[serde(default)]
    pub render: RenderConfig,
}
