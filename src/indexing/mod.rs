// src/indexing/mod.rs
// =============================================================================
// This module submits sitemap URLs to a search-engine indexing API.
//
// Submodules:
// - api: IndexingApi trait and the Google Indexing API v3 client
// - credentials: CredentialProvider trait and the credentials-file provider
// - retry: the bounded backoff state machine
// - submitter: drives entries through the API and builds the SubmissionReport
// =============================================================================

mod api;
mod credentials;
mod retry;
mod submitter;

pub use api::{classify_error, Ack, GoogleIndexingClient, IndexingApi, DEFAULT_ENDPOINT};
pub use credentials::{CredentialProvider, FileCredentialProvider, DEFAULT_TOKEN_URI, INDEXING_SCOPE};
pub use retry::{RetryPolicy, Step};
pub use submitter::{submit, SubmissionOutcome, SubmissionReport, SubmissionStatus, SubmitOptions};
