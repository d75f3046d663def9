//! Session tuning knobs.

use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("disprove timeout must be at least 1 second")]
    DisproveTimeoutTooShort,
}

/// Configuration for one game session.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionConfig {
    /// How long an offered player gets to pick a card to show before
    /// the offer is skipped. `None` disables the timeout entirely and
    /// the session waits forever (a disconnect still skips the offer).
    pub disprove_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.disprove_timeout
            && timeout < Duration::from_secs(1)
        {
            return Err(ConfigError::DisproveTimeoutTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn sub_second_timeout_is_rejected() {
        let config = SessionConfig {
            disprove_timeout: Some(Duration::from_millis(100)),
        };
        assert_eq!(config.validate(), Err(ConfigError::DisproveTimeoutTooShort));

        let config = SessionConfig {
            disprove_timeout: Some(Duration::from_secs(30)),
        };
        assert!(config.validate().is_ok());
    }
}
