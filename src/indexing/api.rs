// src/indexing/api.rs
// =============================================================================
// Google Indexing API v3 client.
//
// One call = one URL:
//   POST https://indexing.googleapis.com/v3/urlNotifications:publish
//   Authorization: Bearer <token>
//   {"url": "...", "type": "URL_UPDATED"}
//
// Errors are sorted into two buckets:
// - retryable: 408, 429 (short-term rate limit), 5xx, timeouts, dropped connections
// - rejected: everything else, including the daily quota being used up
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiError, CredentialError};

pub const DEFAULT_ENDPOINT: &str = "https://indexing.googleapis.com/v3/urlNotifications:publish";

/// Successful answer to a publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub url: String,
    /// `latestUpdate.notifyTime` reported by the API, if any
    pub notify_time: Option<String>,
}

/// The single operation the submitter needs from an indexing service.
#[async_trait]
pub trait IndexingApi: Send + Sync {
    async fn submit_url(&self, url: &str) -> Result<Ack, ApiError>;
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    url_notification_metadata: Option<NotificationMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationMetadata {
    url: Option<String>,
    latest_update: Option<LatestUpdate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestUpdate {
    notify_time: Option<String>,
}

/// Authenticated client for the Google Indexing API.
#[derive(Debug, Clone)]
pub struct GoogleIndexingClient {
    http: Client,
    endpoint: String,
    access_token: String,
}

impl GoogleIndexingClient {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, CredentialError> {
        Self::with_endpoint(access_token, DEFAULT_ENDPOINT, timeout)
    }

    /// Same as [`GoogleIndexingClient::new`] against a custom endpoint.
    pub fn with_endpoint(
        access_token: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::new(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl IndexingApi for GoogleIndexingClient {
    async fn submit_url(&self, url: &str) -> Result<Ack, ApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&PublishRequest {
                url,
                kind: "URL_UPDATED",
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!(url, status = status.as_u16(), "publish response");

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let parsed: PublishResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::rejected(Some(status.as_u16()), format!("Unexpected response: {}", e)))?;

        match parsed.url_notification_metadata {
            Some(metadata) => Ok(Ack {
                url: metadata.url.unwrap_or_else(|| url.to_string()),
                notify_time: metadata.latest_update.and_then(|u| u.notify_time),
            }),
            None => Err(ApiError::rejected(
                Some(status.as_u16()),
                "Unexpected response: no urlNotificationMetadata",
            )),
        }
    }
}

fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::retryable(None, "request timed out")
    } else if error.is_connect() || error.is_request() || error.is_body() {
        ApiError::retryable(None, format!("connection failed: {}", error))
    } else {
        ApiError::rejected(None, error.to_string())
    }
}

/// Turns a non-2xx Indexing API response into an [`ApiError`].
///
/// Google reports both short-term rate limiting and the exhausted daily
/// quota as 429; only the former is worth retrying.
pub fn classify_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let daily_quota = message.to_ascii_lowercase().contains("per day");
    let retryable = match status {
        StatusCode::TOO_MANY_REQUESTS => !daily_quota,
        StatusCode::REQUEST_TIMEOUT => true,
        s => s.is_server_error(),
    };

    ApiError {
        code: Some(status.as_u16()),
        message,
        retryable,
    }
}
