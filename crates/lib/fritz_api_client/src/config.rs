//! Client configuration.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server root, without the `/api/v1` prefix.
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `X-CSRF-Token` on every request when set.
    pub csrf_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            csrf_token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                 |
    /// |--------------------------|-------------------------|
    /// | `FRITZ_API_URL`          | `http://localhost:8080` |
    /// | `FRITZ_API_TIMEOUT_SECS` | `30`                    |
    /// | `FRITZ_CSRF_TOKEN`       | unset                   |
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("FRITZ_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            base_url: std::env::var("FRITZ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            timeout: Duration::from_secs(timeout_secs),
            csrf_token: std::env::var("FRITZ_CSRF_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}
