// src/checker/http.rs
// =============================================================================
// This module checks if sitemap URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when a server refuses HEAD (403, 404, 405)
// - Detects various failure modes (404, timeout, SSL errors, etc.)
// - Runs checks concurrently, bounded by max_workers
//
// Results come back in the same order as the input URLs, so they line up
// with the sitemap entries.
// =============================================================================

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffered()
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::TransportError;

// Represents the status of a link after checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "target", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Link is working (2xx)
    Ok,
    /// Link redirects to another URL (301, 302, etc.)
    Redirect(String), // Holds the redirect target URL
    /// Link is broken (404, 410)
    Broken,
    /// Request timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error (5xx, refused connection, ...)
    Error,
}

// Represents the result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCheckResult {
    /// The URL that was checked
    pub url: String,
    /// The status of the link
    #[serde(flatten)]
    pub status: LinkStatus,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkCheckResult {
    /// Ok and Redirect count as reachable
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LinkStatus::Ok | LinkStatus::Redirect(_))
    }
}

#[derive(Debug, Clone)]
pub struct LinkCheckOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// Maximum number of requests in flight
    pub max_workers: usize,
}

// Checks multiple links concurrently
//
// This is the main entry point for reachability checking.
// It takes the URLs and returns one result per URL, in the same order.
pub async fn check_links(
    urls: Vec<String>,
    options: &LinkCheckOptions,
) -> Result<Vec<LinkCheckResult>, TransportError> {
    // One client for all requests (connection pooling)
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| TransportError::network(format!("failed to create HTTP client: {}", e)))?;

    debug!(count = urls.len(), workers = options.max_workers, "checking links");

    // .buffered(n) runs up to n checks at once but yields results in input order
    let results: Vec<LinkCheckResult> = stream::iter(urls.into_iter().map(|url| {
        let client = client.clone();
        async move { check_single_link(&client, url).await }
    }))
    .buffered(options.max_workers.max(1))
    .collect()
    .await;

    for result in results.iter().filter(|r| !r.is_ok()) {
        warn!(url = %result.url, reason = result.message.as_deref().unwrap_or(""), "unreachable URL");
    }

    Ok(results)
}

// Checks a single link: HEAD first, GET when the server refuses HEAD
async fn check_single_link(client: &Client, url: String) -> LinkCheckResult {
    let result = match client.head(&url).send().await {
        Ok(response) if refuses_head(response.status()) => client.get(&url).send().await,
        other => other,
    };

    match result {
        Ok(response) => analyze_response(url, response.status(), response.headers()),
        Err(e) => categorize_error(url, e),
    }
}

// Some servers answer HEAD with these even though GET works
fn refuses_head(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
    )
}

// Analyzes an HTTP response to determine link status
//
// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect (only seen when the redirect limit was not followed)
// - 404/410: Broken
// - anything else: Error
fn analyze_response(
    url: String,
    status_code: StatusCode,
    headers: &reqwest::header::HeaderMap,
) -> LinkCheckResult {
    if status_code.is_success() {
        LinkCheckResult {
            url,
            status: LinkStatus::Ok,
            message: Some(format!("HTTP {}", status_code.as_u16())),
        }
    } else if status_code.is_redirection() {
        // Try to get the Location header to show where it redirects to
        let redirect_target = headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        LinkCheckResult {
            url,
            status: LinkStatus::Redirect(redirect_target.clone()),
            message: Some(format!("HTTP {} -> {}", status_code.as_u16(), redirect_target)),
        }
    } else if matches!(status_code, StatusCode::NOT_FOUND | StatusCode::GONE) {
        LinkCheckResult {
            url,
            status: LinkStatus::Broken,
            message: Some(format!("HTTP {}", status_code.as_u16())),
        }
    } else {
        LinkCheckResult {
            url,
            status: LinkStatus::Error,
            message: Some(format!("HTTP {}", status_code.as_u16())),
        }
    }
}

// Categorizes different error types from reqwest
fn categorize_error(url: String, error: reqwest::Error) -> LinkCheckResult {
    let error_string = error.to_string();
    let lowered = error_string.to_ascii_lowercase();

    let (status, message) = if error.is_timeout() {
        (LinkStatus::Timeout, "Request timed out".to_string())
    } else if error.is_redirect() {
        (LinkStatus::TooManyRedirects, "Too many redirects".to_string())
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if lowered.contains("dns") {
            (LinkStatus::DnsError, "Could not resolve hostname".to_string())
        } else {
            (LinkStatus::Error, "Connection failed".to_string())
        }
    } else if lowered.contains("certificate") || lowered.contains("ssl") || lowered.contains("tls") {
        (LinkStatus::SslError, "SSL certificate error".to_string())
    } else {
        (LinkStatus::Error, error_string)
    };

    LinkCheckResult {
        url,
        status,
        message: Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, LOCATION};

    #[test]
    fn test_link_result_is_ok() {
        let ok_result = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Ok,
            message: None,
        };
        assert!(ok_result.is_ok());

        let broken_result = LinkCheckResult {
            url: "https://example.com".to_string(),
            status: LinkStatus::Broken,
            message: None,
        };
        assert!(!broken_result.is_ok());
    }

    #[test]
    fn test_analyze_redirect_reads_location() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://example.com/new"));
        let result = analyze_response(
            "https://example.com/old".to_string(),
            StatusCode::MOVED_PERMANENTLY,
            &headers,
        );
        assert_eq!(result.status, LinkStatus::Redirect("https://example.com/new".to_string()));
        assert!(result.is_ok());
    }

    #[test]
    fn test_analyze_gone_and_server_error() {
        let headers = HeaderMap::new();
        let gone = analyze_response("https://example.com/x".to_string(), StatusCode::GONE, &headers);
        assert_eq!(gone.status, LinkStatus::Broken);
        let error = analyze_response(
            "https://example.com/x".to_string(),
            StatusCode::BAD_GATEWAY,
            &headers,
        );
        assert_eq!(error.status, LinkStatus::Error);
        assert_eq!(error.message.as_deref(), Some("HTTP 502"));
    }

    #[test]
    fn test_head_refusals_trigger_get() {
        assert!(refuses_head(StatusCode::METHOD_NOT_ALLOWED));
        assert!(refuses_head(StatusCode::NOT_FOUND));
        assert!(!refuses_head(StatusCode::OK));
        assert!(!refuses_head(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_status_serializes_flat() {
        let result = LinkCheckResult {
            url: "https://example.com/".to_string(),
            status: LinkStatus::Redirect("https://example.com/home".to_string()),
            message: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "redirect");
        assert_eq!(json["target"], "https://example.com/home");
    }
}
