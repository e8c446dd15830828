//! Resilient transport layer for the CityVibes backend
//!
//! Wraps the backend's evolving JSON API behind a typed surface: bearer
//! auth with an explicit token lifecycle, request timeouts, bounded retry
//! with exponential backoff, and a classified error taxonomy so no raw
//! transport or parse error escapes to callers.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod token_store;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, UserFacingError};
pub use models::{ChatReply, DirectionsSummary, RecommendationPage, UserProfile};
pub use retry::{Retryable, RetryConfig, with_retry};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
