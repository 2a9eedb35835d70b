// src/checker/mod.rs
// =============================================================================
// This module checks that the URLs listed in a sitemap actually respond.
//
// Submodules:
// - http: Makes HTTP requests to check if links are alive
//
// The pipeline runs it only with --check-links; unreachable URLs are then
// skipped during submission.
// =============================================================================

mod http;

pub use http::{check_links, LinkCheckOptions, LinkCheckResult, LinkStatus};
