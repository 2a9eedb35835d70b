// src/fetch/http.rs
// =============================================================================
// This module downloads sitemap documents over HTTP.
//
// The pipeline only needs "give me the bytes behind this URL", so that is the
// DocumentFetcher trait. HttpFetcher is the real implementation on top of
// reqwest; tests swap in an in-memory fetcher.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::TransportError;

/// Raw bytes of a fetched document plus the content type the server declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// Where the document was actually served from, after redirects
    pub final_url: Option<String>,
}

impl FetchedDocument {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            final_url: None,
        }
    }
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, TransportError>;
}

/// Fetches documents with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| TransportError::network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, TransportError> {
        debug!(url, "fetching document");

        let response = self.client.get(url).send().await.map_err(describe_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let final_url = response.url().to_string();
        if final_url != url {
            debug!(url, final_url = %final_url, "followed redirect");
        }

        let bytes = response.bytes().await.map_err(describe_error)?;
        debug!(url, bytes = bytes.len(), "document fetched");

        Ok(FetchedDocument {
            bytes: bytes.to_vec(),
            content_type,
            final_url: Some(final_url),
        })
    }
}

fn describe_error(error: reqwest::Error) -> TransportError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    TransportError::network(message)
}
