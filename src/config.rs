//! Runtime configuration, resolved once at startup

use std::time::Duration;

/// Console configuration.
///
/// Resolved a single time when the process starts and passed explicitly
/// into the API client and controllers. Read-only afterwards; nothing
/// in the core reads the environment again.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the SushiDB API server, e.g. `http://127.0.0.1:8080`.
    pub api_base: String,
    /// Interval for the store-info auto-refresh poller.
    pub poll_interval: Duration,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// * `SUSHI_API_BASE` - API base URL (default `http://127.0.0.1:8080`)
    /// * `SUSHI_POLL_INTERVAL_MS` - store polling interval (default 3000)
    pub fn from_env() -> Self {
        let api_base = std::env::var("SUSHI_API_BASE")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let poll_ms: u64 = std::env::var("SUSHI_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            api_base,
            poll_interval: Duration::from_millis(poll_ms),
        }
    }

    /// Configuration pointing at an explicit base URL, with the default
    /// 3 second polling interval.
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            poll_interval: Duration::from_millis(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base("http://127.0.0.1:8080")
    }
}
