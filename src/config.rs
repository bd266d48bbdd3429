//! Environment-driven configuration.

use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_TURN_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// How long the current player has before the server acts for them.
    pub turn_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("APP_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let turn_timeout_secs = std::env::var("APP_TURN_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TURN_TIMEOUT_SECS)
            .max(1);

        Self {
            bind_addr,
            turn_timeout: Duration::from_secs(turn_timeout_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
        }
    }
}
