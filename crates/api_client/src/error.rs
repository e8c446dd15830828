//! Classified transport errors
//!
//! Every failure crossing the transport boundary is one of these kinds;
//! each knows whether a retry is worthwhile and what to show the user.

use thiserror::Error;

/// Errors that can occur while talking to the backend
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request aborted by the client-side deadline
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout that elapsed, in seconds
        timeout_secs: u64,
    },

    /// Any transport-level failure other than a deadline abort
    /// (DNS, connection refused, TLS, reset mid-body)
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Server-supplied message, when the body carried one
        message: Option<String>,
    },

    /// HTTP 401; the stored token has been cleared as a side effect
    #[error("Authentication required")]
    Unauthorized,

    /// Any other 4xx
    #[error("Request failed (HTTP {status}): {message}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Server-supplied or status-line message
        message: String,
    },

    /// 5xx, or a backend-reported upstream failure in a 200 body
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-supplied or status-line message
        message: String,
    },

    /// Payload not parseable into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Short, non-technical failure copy for the caller to surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    /// One-line heading
    pub title: String,
    /// Sentence-length explanation
    pub message: String,
    /// Whether offering a retry affordance makes sense
    pub retryable: bool,
}

impl ApiError {
    /// Whether re-attempting the same request is expected to plausibly
    /// succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::NetworkUnavailable(_)
                | Self::RateLimited { .. }
                | Self::Server { .. }
                | Self::Unknown(_)
        )
    }

    /// Map this error to user-facing copy, derived purely from the
    /// classified kind; never a raw technical string.
    #[must_use]
    pub fn user_facing(&self) -> UserFacingError {
        match self {
            Self::RateLimited { message } => UserFacingError {
                title: "Too Many Requests".to_string(),
                message: message.as_ref().map_or_else(
                    || {
                        "You're making requests too quickly. Please wait a moment and try again."
                            .to_string()
                    },
                    |m| format!("{m}. Please try again shortly."),
                ),
                retryable: true,
            },
            Self::Unauthorized => UserFacingError {
                title: "Authentication Required".to_string(),
                message: "Please log in again to continue.".to_string(),
                retryable: false,
            },
            Self::Timeout { .. } | Self::NetworkUnavailable(_) => UserFacingError {
                title: "Connection Error".to_string(),
                message: "Unable to connect to the server. Please check your internet connection."
                    .to_string(),
                retryable: true,
            },
            Self::Server { .. } => UserFacingError {
                title: "Server Error".to_string(),
                message: "The server is experiencing issues. Please try again later.".to_string(),
                retryable: true,
            },
            Self::Client { message, .. } => UserFacingError {
                title: "Request Error".to_string(),
                message: if message.is_empty() {
                    "Invalid request. Please check your input.".to_string()
                } else {
                    message.clone()
                },
                retryable: false,
            },
            Self::Decode(_) => UserFacingError {
                title: "Error".to_string(),
                message: "Received an unexpected response. Please try again.".to_string(),
                retryable: false,
            },
            Self::Unknown(_) => UserFacingError {
                title: "Error".to_string(),
                message: "An unexpected error occurred. Please try again.".to_string(),
                retryable: true,
            },
        }
    }
}

impl From<domain::DomainError> for ApiError {
    fn from(err: domain::DomainError) -> Self {
        Self::Decode(err.to_string())
    }
}
