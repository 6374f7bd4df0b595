//! Service configuration.

use std::time::Duration;

use cumulo_platform::env::optional_var;
use cumulo_platform::PlatformError;

/// Env file loaded before reading the process environment, for local runs.
pub const ENV_FILE: &str = ".env-ms";

/// Process configuration, sourced from the environment.
///
/// The `C8Y_*` connection variables are consumed by
/// [`cumulo_platform::MultiTenantApp::from_env`]; this covers the rest.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Bind port (`SERVER_PORT`, default 80).
    pub port: u16,
    /// Subscription poll interval (`SUBSCRIPTION_POLL_SECONDS`, default 60).
    pub poll_interval: Duration,
    /// Background sweep interval (`PROCESS_INTERVAL_SECONDS`, default 300).
    pub process_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            poll_interval: Duration::from_secs(60),
            process_interval: Duration::from_secs(300),
        }
    }
}

impl ServiceConfig {
    /// Read the configuration, falling back to defaults per variable.
    pub fn from_env() -> Result<Self, PlatformError> {
        let defaults = Self::default();
        Ok(Self {
            host: optional_var("HOST").unwrap_or(defaults.host),
            port: parse_var("SERVER_PORT")?.unwrap_or(defaults.port),
            poll_interval: parse_var("SUBSCRIPTION_POLL_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            process_interval: parse_var("PROCESS_INTERVAL_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.process_interval),
        })
    }

    /// `host:port` to bind the HTTP listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, PlatformError> {
    match optional_var(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| PlatformError::Config(format!("cannot parse {key}={raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test mutating the shared process environment, run sequentially.
    #[test]
    fn test_config_defaults_and_overrides() {
        for key in ["HOST", "SERVER_PORT", "SUBSCRIPTION_POLL_SECONDS"] {
            std::env::remove_var(key);
        }
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:80");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.process_interval, Duration::from_secs(300));

        std::env::set_var("SERVER_PORT", "8080");
        std::env::set_var("SUBSCRIPTION_POLL_SECONDS", "5");
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval, Duration::from_secs(5));

        std::env::set_var("SERVER_PORT", "not-a-port");
        assert!(ServiceConfig::from_env().is_err());
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("SUBSCRIPTION_POLL_SECONDS");
    }
}
