//! Runtime settings for the server binary

use std::time::Duration;

use serde::Deserialize;
use svckit_common::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Load settings from `PORT` and `SHUTDOWN_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        svckit_common::config::load()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
