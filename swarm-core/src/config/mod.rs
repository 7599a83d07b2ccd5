//! Engine configuration
//!
//! [`EngineConfig`] holds the response deadlines and line-reader timing.
//! With the `serde` feature it can be persisted as postcard binary data;
//! with `toml` it can be loaded from text.

#[cfg(feature = "serde")]
mod persist;
pub mod types;

pub use types::*;

/// Problems loading or validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A timeout is zero
    ZeroTimeout,
    /// `max_lines_per_poll` is zero
    ZeroPollBudget,
    /// Postcard encoding failed (buffer too small)
    Serialize,
    /// Postcard or TOML decoding failed
    Deserialize,
}

impl EngineConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            self.command_timeout_ms,
            self.message_read_timeout_ms,
            self.message_delete_timeout_ms,
            self.transmit_timeout_ms,
        ];
        if timeouts.contains(&0) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_lines_per_poll == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.timeout_ms(TimeoutClass::Command), 1000);
        assert_eq!(config.timeout_ms(TimeoutClass::MessageDelete), 5000);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = EngineConfig {
            transmit_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_rejects_zero_poll_budget() {
        let config = EngineConfig {
            max_lines_per_poll: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollBudget));
    }
}
