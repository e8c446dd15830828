//! HTTP transport for the CityVibes backend
//!
//! One logical request: attach the bearer token when present, send under
//! the configured deadline, classify the outcome, normalize the payload.
//! Retryable failures go back through the retry policy; a 401 clears the
//! token store before surfacing.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use domain::{CityEvent, Coordinate};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    AuthBody, ChatReply, DirectionsSummary, RecommendationPage, UserProfile, events_from_body,
};
use crate::retry::with_retry;
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Client for the CityVibes backend API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with an explicit token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ApiError::Unknown(err.to_string()))?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Create a client from configuration alone: file-backed token
    /// storage when `token_path` is set, in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let tokens: Arc<dyn TokenStore> = match &config.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config, tokens)
    }

    /// The token store this client reads and clears
    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // ------------------------------------------------------------------
    // Endpoint surface
    // ------------------------------------------------------------------

    /// Send a chat message, optionally anchored to the user's location.
    #[instrument(skip(self, message))]
    pub async fn chat(
        &self,
        message: &str,
        location: Option<Coordinate>,
    ) -> Result<ChatReply, ApiError> {
        let mut body = json!({ "message": message });
        if let Some(coordinate) = location {
            body["latitude"] = json!(coordinate.latitude());
            body["longitude"] = json!(coordinate.longitude());
        }

        with_retry(&self.config.retry, || async {
            let raw = self
                .execute(Method::POST, "/api/chat", &[], Some(&body))
                .await?;
            decode_or_reported(&raw, ChatReply::from_body)
        })
        .await
    }

    /// Fetch quick recommendations for a category.
    #[instrument(skip(self))]
    pub async fn quick_recommendations(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<RecommendationPage, ApiError> {
        let query = [
            ("category", category.to_string()),
            ("limit", limit.to_string()),
        ];
        with_retry(&self.config.retry, || async {
            let raw = self
                .execute(Method::GET, "/api/quick_recs", &query, None)
                .await?;
            decode_or_reported(&raw, |body| RecommendationPage::from_body(body, category))
        })
        .await
    }

    /// Fetch the cross-category top recommendations.
    #[instrument(skip(self))]
    pub async fn top_recommendations(&self, limit: u32) -> Result<RecommendationPage, ApiError> {
        let query = [("limit", limit.to_string())];
        with_retry(&self.config.retry, || async {
            let raw = self
                .execute(Method::GET, "/api/top_recommendations", &query, None)
                .await?;
            decode_or_reported(&raw, |body| RecommendationPage::from_body(body, "top"))
        })
        .await
    }

    /// Fetch walking directions to a destination.
    #[instrument(skip(self))]
    pub async fn directions(
        &self,
        destination: Coordinate,
    ) -> Result<DirectionsSummary, ApiError> {
        let query = [
            ("lat", destination.latitude().to_string()),
            ("lng", destination.longitude().to_string()),
        ];
        with_retry(&self.config.retry, || async {
            let raw = self
                .execute(Method::GET, "/api/directions", &query, None)
                .await?;
            decode_or_reported(&raw, DirectionsSummary::from_body)
        })
        .await
    }

    /// Fetch the permitted city events feed.
    #[instrument(skip(self))]
    pub async fn events(&self) -> Result<Vec<CityEvent>, ApiError> {
        with_retry(&self.config.retry, || async {
            let raw = self.execute(Method::GET, "/api/events", &[], None).await?;
            decode_or_reported(&raw, events_from_body)
        })
        .await
    }

    /// Log in and persist the session token.
    ///
    /// Auth requests are never retried; failures surface immediately.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let body = json!({ "email": email, "password": password });
        self.authenticate("/api/auth/login", &body).await
    }

    /// Create an account and persist the session token.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
    ) -> Result<UserProfile, ApiError> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(name) = first_name {
            body["first_name"] = json!(name);
        }
        self.authenticate("/api/auth/signup", &body).await
    }

    /// Clear the stored session token. Local only; the backend keeps no
    /// session state beyond the bearer token itself.
    pub async fn logout(&self) {
        self.tokens.clear().await;
    }

    async fn authenticate(&self, path: &str, body: &Value) -> Result<UserProfile, ApiError> {
        let raw = self.execute(Method::POST, path, &[], Some(body)).await?;
        let auth: AuthBody = decode_or_reported(&raw, |value| {
            serde_json::from_value(value.clone()).map_err(|err| ApiError::Decode(err.to_string()))
        })?;

        self.tokens
            .set(&auth.token)
            .await
            .map_err(|err| ApiError::Unknown(err.to_string()))?;
        Ok(auth.user)
    }

    // ------------------------------------------------------------------
    // One logical request
    // ------------------------------------------------------------------

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = self.tokens.get().await {
            request = request.bearer_auth(token.expose_secret());
        }

        debug!(url = %url, "Sending request");
        let response = request.send().await.map_err(|err| self.classify_transport(&err))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|err| {
                if err.is_timeout() {
                    ApiError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else if err.is_decode() {
                    ApiError::Decode(err.to_string())
                } else {
                    ApiError::NetworkUnavailable(err.to_string())
                }
            });
        }

        Err(self.classify_status(response).await)
    }

    /// A deadline abort is a `Timeout`; every other transport-level
    /// failure (DNS, connection refused, TLS) is `NetworkUnavailable`.
    fn classify_transport(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            ApiError::NetworkUnavailable(err.to_string())
        }
    }

    async fn classify_status(&self, response: Response) -> ApiError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Stored credential is dead; force a re-login.
            self.tokens.clear().await;
            return ApiError::Unauthorized;
        }

        let message = body_message(response).await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ApiError::RateLimited { message };
        }

        let message = message.unwrap_or_else(|| format!("HTTP {status}"));
        if status.is_server_error() {
            ApiError::Server {
                status: status.as_u16(),
                message,
            }
        } else if status.is_client_error() {
            ApiError::Client {
                status: status.as_u16(),
                message,
            }
        } else {
            ApiError::Unknown(message)
        }
    }
}

/// Extract a server-supplied error message from a failure body, when the
/// body is JSON and carries one.
async fn body_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let value: Value = serde_json::from_str(&text).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Decode a 2xx payload, falling back to the backend's in-body `error`
/// report when the expected shape is absent. The backend signals upstream
/// failures this way on an otherwise successful response.
fn decode_or_reported<T>(
    body: &Value,
    decode: impl FnOnce(&Value) -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    decode(body).map_err(|err| {
        body.get("error").and_then(Value::as_str).map_or(err, |message| {
            ApiError::Server {
                status: 200,
                message: message.to_owned(),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        assert!(ApiClient::from_config(ClientConfig::default()).is_ok());
    }

    #[test]
    fn from_config_without_token_path_uses_memory_store() {
        let client = ApiClient::from_config(ClientConfig::default()).expect("client");
        // Memory store starts empty.
        let store = Arc::clone(client.token_store());
        let token = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(store.get());
        assert!(token.is_none());
    }

    #[test]
    fn decode_or_reported_prefers_the_decoded_value() {
        let body = json!({"reply": "hello", "error": "ignored"});
        let reply = decode_or_reported(&body, ChatReply::from_body).expect("decodes");
        assert_eq!(reply.reply, "hello");
    }

    #[test]
    fn decode_or_reported_surfaces_in_body_error() {
        let body = json!({"error": "upstream provider failed"});
        let result = decode_or_reported(&body, ChatReply::from_body);
        match result {
            Err(ApiError::Server { message, .. }) => {
                assert_eq!(message, "upstream provider failed");
            },
            other => unreachable!("expected reported server error, got {other:?}"),
        }
    }

    #[test]
    fn decode_or_reported_without_report_keeps_decode_error() {
        let body = json!({"unexpected": true});
        let result = decode_or_reported(&body, ChatReply::from_body);
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
