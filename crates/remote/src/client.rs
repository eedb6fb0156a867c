//! REST client for the hosted backend's table API.
//!
//! Tables are exposed PostgREST-style under `/rest/v1/{table}`; filters,
//! ordering and limits travel in the query string.

use std::sync::RwLock;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::errors::{RemoteError, Result};

/// Error body returned by the table and auth APIs.
///
/// The two APIs disagree on field names, so every variant is optional.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
}

/// Query-string builder for table reads and filtered writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    /// `select=*` query.
    pub fn all() -> Self {
        Self::default().param("select", "*")
    }

    /// Adds a raw `key=value` pair.
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    pub fn gte(self, column: &str, value: &str) -> Self {
        self.param(column, format!("gte.{}", value))
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.param("order", format!("{}.desc", column))
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.param("order", format!("{}.asc", column))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Client for the hosted backend.
///
/// Holds the access token of the current session; until one is set, requests
/// authenticate with the anon key alone.
#[derive(Debug)]
pub struct RestClient {
    client: reqwest::Client,
    stream_client: reqwest::Client,
    config: RemoteConfig,
    access_token: RwLock<Option<String>>,
}

impl RestClient {
    pub fn new(config: RemoteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");
        // Realtime streams stay open indefinitely; only the connect phase is bounded.
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            stream_client,
            config,
            access_token: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(|p| p.into_inner()) = token;
    }

    pub fn has_session(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Create headers for an API request.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = HeaderValue::from_str(&self.config.anon_key)
            .map_err(|_| RemoteError::auth("Invalid API key format"))?;
        headers.insert("apikey", api_key);

        let bearer = self
            .access_token
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone());
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|_| RemoteError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Parse a JSON response body.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            return Err(Self::error_from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteError::Json(e)
        })
    }

    fn error_from_body(status: u16, body: &str) -> RemoteError {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(ApiErrorResponse {
                message: Some(message),
                code,
            }) => match code {
                Some(code) => {
                    let code = code
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| code.to_string());
                    RemoteError::api(status, format!("{}: {}", code, message))
                }
                None => RemoteError::api(status, message),
            },
            _ => RemoteError::api(status, format!("Request failed: {}", body)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table API
    // ─────────────────────────────────────────────────────────────────────────

    /// GET /rest/v1/{table}?{query}
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>> {
        let url = format!("{}?{}", self.config.rest_url(table), query.to_query_string());
        debug!("Selecting from {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// POST /rest/v1/{table} returning the inserted rows.
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        rows: &[B],
    ) -> Result<Vec<T>> {
        let url = self.config.rest_url(table);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// PATCH /rest/v1/{table}?{query} returning the updated rows.
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<T>> {
        let url = format!("{}?{}", self.config.rest_url(table), query.to_query_string());

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// DELETE /rest/v1/{table}?{query}, returning how many rows went away.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<usize> {
        let url = format!("{}?{}", self.config.rest_url(table), query.to_query_string());

        let response = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let deleted: Vec<serde_json::Value> = Self::parse_response(response).await?;
        Ok(deleted.len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth and realtime transport
    // ─────────────────────────────────────────────────────────────────────────

    /// POST to an auth endpoint.
    pub(crate) async fn auth_post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.config.auth_url(path))
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// PUT to an auth endpoint. Requires a session.
    pub(crate) async fn auth_put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        if !self.has_session() {
            return Err(RemoteError::auth("No active session"));
        }
        let response = self
            .client
            .put(self.config.auth_url(path))
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Opens a realtime event stream. The body is read incrementally by the caller.
    pub(crate) async fn open_stream(&self, query: &Query) -> Result<reqwest::Response> {
        let url = format!("{}?{}", self.config.realtime_url(), query.to_query_string());
        debug!("Opening realtime stream {}", url);

        let response = self
            .stream_client
            .get(&url)
            .headers(self.headers()?)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_body(status.as_u16(), &body));
        }
        Ok(response)
    }
}
