//! Attendance backend HTTP client
//!
//! Thin typed wrapper over `reqwest`. Every call takes the caller's
//! [`RequestContext`] and returns an [`ApiResult`], mapping transport
//! failures, 401s and other non-success statuses onto [`ApiError`].

use std::time::Duration;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use crate::config::ApiConfig;
use crate::state::RequestContext;
use crate::utils::errors::{ApiError, ApiResult, AttendanceError, Result};
use crate::utils::logging::log_api_error;

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Plain `{message}` acknowledgement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Typed client for the attendance backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AttendanceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for the given path segments; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    pub async fn get<T>(&self, ctx: &RequestContext, segments: &[&str], query: &[(&str, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let request = self.client.get(&url).query(query);
        self.send(ctx, Method::GET, &url, request).await
    }

    pub async fn post<B, T>(&self, ctx: &RequestContext, segments: &[&str], body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(ctx, Method::POST, &url, request).await
    }

    pub async fn put<B, T>(&self, ctx: &RequestContext, segments: &[&str], body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let mut request = self.client.put(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(ctx, Method::PUT, &url, request).await
    }

    pub async fn delete<T>(&self, ctx: &RequestContext, segments: &[&str]) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let request = self.client.delete(&url);
        self.send(ctx, Method::DELETE, &url, request).await
    }

    async fn send<T>(&self, ctx: &RequestContext, method: Method, url: &str, mut request: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        if let Some(credentials) = ctx.credentials() {
            if credentials.is_expired_at(Utc::now()) {
                log_api_error(url, "token expired", Some("request not sent"));
                return Err(ApiError::Unauthorized("Token expired".to_string()));
            }
            request = request.bearer_auth(&credentials.token);
        }

        debug!(method = %method, url = url, "Sending API request");

        let response = request.send().await.map_err(|e| {
            let error = if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e.to_string())
            };
            log_api_error(url, &error.to_string(), Some(method.as_str()));
            error
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let error = if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e.to_string())
            };
            log_api_error(url, &error.to_string(), Some("reading response body"));
            error
        })?;

        if !status.is_success() {
            let error = error_from_status(status, &body);
            log_api_error(url, &error.to_string(), Some(method.as_str()));
            return Err(error);
        }

        debug!(status = status.as_u16(), url = url, "API request succeeded");

        serde_json::from_str(&body).map_err(|e| {
            log_api_error(url, &e.to_string(), Some("decoding response body"));
            ApiError::InvalidResponse(e.to_string())
        })
    }
}

/// Map a non-success response onto the tagged error
fn error_from_status(status: StatusCode, body: &str) -> ApiError {
    let server_message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    });

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized(message)
    } else {
        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}
