//! Bounded retry with exponential backoff
//!
//! Wraps a no-argument async operation: non-retryable failures re-raise
//! immediately, retryable ones wait `initial_delay × multiplier^attempt`
//! between strictly sequential attempts, and the last classified failure
//! is re-raised once attempts are exhausted.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds (default: 1000)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Cap on the delay between attempts in milliseconds (default: 30000)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Whether to add jitter to the delay (default: false)
    #[serde(default)]
    pub jitter_enabled: bool,

    /// Maximum jitter factor, 0.0 to 1.0 (default: 0.1)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_delay() -> u64 {
    1000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_delay() -> u64 {
    30_000
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay(),
            jitter_enabled: false,
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Create a configuration with custom attempt count and initial delay
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            ..Self::default()
        }
    }

    /// Enable jitter to spread out concurrent retries
    #[must_use]
    pub const fn with_jitter(mut self) -> Self {
        self.jitter_enabled = true;
        self
    }

    /// Calculate the delay after a failed attempt (0-indexed)
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt.min(63) as i32);
        let capped = base.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled {
            let jitter_range = capped * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped + jitter).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if re-attempting the operation is worthwhile
    fn is_retryable(&self) -> bool;
}

impl Retryable for crate::error::ApiError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Execute an async operation with bounded retry.
///
/// Success on any attempt returns immediately. A non-retryable error
/// returns without further attempts. Attempts are strictly sequential;
/// the backoff sleep is the only suspension between them.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempts = attempt, "Operation succeeded after retries");
                }
                return Ok(value);
            },
            Err(err) => {
                if !err.is_retryable() {
                    debug!(
                        attempts = attempt,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return Err(err);
                }

                if attempt >= max_attempts {
                    warn!(
                        attempts = attempt,
                        error = %err,
                        "Operation failed after exhausting attempts"
                    );
                    return Err(err);
                }

                let delay = config.delay_for_attempt(attempt - 1);
                #[allow(clippy::cast_possible_truncation)]
                {
                    warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Operation failed, retrying"
                    );
                }
                tokio::time::sleep(delay).await;
            },
        }
    }
}
