// src/config.rs
// =============================================================================
// Run configuration.
//
// Everything the pipeline can be tuned with lives in one Config struct with
// sensible defaults. The CLI fills it from command-line flags; tests build it
// with struct update syntax (..Config::default()).
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::indexing::SubmitOptions;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("SitemapSentinel/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for each HTTP request (sitemap fetch, link checks, API calls)
    pub request_timeout: Duration,

    /// User-Agent header for sitemap fetches and link checks
    pub user_agent: String,

    /// Check every listed URL for reachability
    pub check_links: bool,

    /// Maximum number of reachability checks in flight
    pub max_workers: usize,

    /// Fetch and validate the children of a sitemap index (one level only)
    pub expand_index: bool,

    /// Submit URLs to the indexing API after a successful validation
    pub submit: bool,

    /// Credentials file for the indexing API (required when submitting)
    pub credentials_path: Option<PathBuf>,

    /// How submission retries, paces and batches its calls
    pub submit_options: SubmitOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            check_links: false,
            max_workers: 5,
            expand_index: false,
            submit: false,
            credentials_path: None,
            submit_options: SubmitOptions::default(),
        }
    }
}
