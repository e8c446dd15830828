//! Client configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Configuration for the backend client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (default: <http://localhost:5001>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Path of the persisted auth token; in-memory storage when absent
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Retry behavior for retryable failures
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token_path: None,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the base URL taken from the `API_URL`
    /// environment variable when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("API_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        config
    }
}
