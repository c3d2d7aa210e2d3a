//! Client configuration

use std::env;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://127.0.0.1:8080")
    pub base_url: String,
    /// Request timeout in seconds (ignored in the browser)
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Load configuration from `DESKBOOK_API_URL` and `DESKBOOK_TIMEOUT_SECS`
    pub fn from_env() -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        dotenvy::dotenv().ok();

        let base_url =
            env::var("DESKBOOK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("DESKBOOK_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()?;

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
