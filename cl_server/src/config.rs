//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use clueless::session::SessionConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Complete server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Session tuning passed through to the game.
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// CLI arguments take priority over the environment; built-in
    /// defaults fill in the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        disprove_timeout_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:7878"
                    .parse()
                    .expect("Default bind address is valid")
            });

        let disprove_timeout_secs: Option<u64> = disprove_timeout_override.or_else(|| {
            std::env::var("DISPROVE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
        });

        let session = SessionConfig {
            disprove_timeout: disprove_timeout_secs.map(Duration::from_secs),
        };

        Ok(ServerConfig { bind, session })
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "DISPROVE_TIMEOUT_SECS".to_string(),
                reason: reason.to_string(),
            })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_beat_defaults() {
        let bind: SocketAddr = "0.0.0.0:9000".parse().unwrap();
        let config = ServerConfig::from_env(Some(bind), Some(30)).unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(
            config.session.disprove_timeout,
            Some(Duration::from_secs(30))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let config = ServerConfig::from_env(None, Some(0)).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
