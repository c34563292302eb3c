use std::path::Path;

use http::HeaderValue;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;

        tracing::debug!(
            config_path = %path.display(),
            debug = config.render.debug,
            "loaded faultline configuration"
        );

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable for rendering
    ///
    /// # Errors
    ///
    /// Returns an error if the server message is blank or the content type
    /// is not a valid header value
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.render.server_message.trim().is_empty() {
            anyhow::bail!("render.server_message must not be empty");
        }

        if self.render.content_type.trim().is_empty() {
            anyhow::bail!("render.content_type must not be empty");
        }

        HeaderValue::from_str(&self.render.content_type).map_err(|e| {
            anyhow::anyhow!(
                "render.content_type is not a valid header value ({:?}): {e}",
                self.render.content_type
            )
        })?;

        Ok(())
    }
}
