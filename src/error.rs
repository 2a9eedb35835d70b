// src/error.rs
// =============================================================================
// Error types for the whole library.
//
// Which errors are fatal?
// - TransportError: the sitemap could not be downloaded -> abort the run
// - ParseError: the sitemap is not a sitemap -> abort the run
// - CredentialError: only fatal when submission was requested
// - ApiError: never fatal, the submitter turns it into a per-entry outcome
//
// Validation problems are NOT errors here: they are data (ValidationIssue)
// returned inside a ValidationReport.
// =============================================================================

use std::fmt;
use thiserror::Error;

/// The sitemap could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct TransportError {
    /// HTTP status when the server answered, None for network failures
    pub status_code: Option<u16>,
    pub message: String,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "HTTP {}: {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(code),
            message: message.into(),
        }
    }
}

/// The fetched bytes are not a sitemap document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    #[error("unrecognized root element <{0}> (expected <urlset> or <sitemapindex>)")]
    UnrecognizedRoot(String),
    #[error("unexpected content after the root element")]
    TrailingContent,
    #[error("entry {index} has no <loc>")]
    MissingLocation { index: usize },
}

/// Credentials could not be turned into an authenticated client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("credential error: {reason}")]
pub struct CredentialError {
    pub reason: String,
}

impl CredentialError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A single indexing-API call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status of the API response, None for transport failures
    pub code: Option<u16>,
    pub message: String,
    /// Whether the same call may succeed if repeated later
    pub retryable: bool,
}

impl ApiError {
    pub fn retryable(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rejected(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: false,
        }
    }
}

/// Terminal failures of the check-and-submit pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid sitemap URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to fetch sitemap: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to parse sitemap: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("submission requested but no credentials file was given")]
    MissingCredentials,
}
