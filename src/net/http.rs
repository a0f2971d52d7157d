//! JSON transport with bearer-token injection.
//!
//! ERROR HANDLING
//! ==============
//! Every outcome is folded into `Result<Value, ApiError>`. A `401` from any
//! endpoint clears the token store here, before the caller sees the error,
//! so no stale token survives an authorization failure.

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use crate::config::ClientConfig;
use crate::session::SharedTokenStore;

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    store: SharedTokenStore,
}

impl HttpClient {
    /// Build a client for `config.api_base_url` backed by `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: SharedTokenStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::Network(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url: config.api_base_url.trim_end_matches('/').to_owned(), store })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET {base}{path}`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; see [`ApiError::from_status`].
    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.send(self.http.get(self.endpoint(path))).await
    }

    /// `POST {base}{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; see [`ApiError::from_status`].
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.send(self.http.post(self.endpoint(path)).json(body))
            .await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let request = match self.store.get() {
            Some(tokens) => request.header(AUTHORIZATION, format!("Bearer {}", tokens.access_token)),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("api returned 401, clearing stored session");
            self.store.clear();
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &text));
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Decode a JSON value into `T`, reporting failures as malformed responses.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if `value` does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
