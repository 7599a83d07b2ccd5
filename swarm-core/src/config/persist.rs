//! Config persistence (postcard binary, TOML text)

use super::{ConfigError, EngineConfig};

impl EngineConfig {
    /// Serialize into `buffer` as postcard, returning the used bytes
    pub fn to_bytes<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Load a postcard-encoded config and validate it
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// ```toml
    /// command_timeout_ms = 1500
    /// max_lines_per_poll = 8
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}
