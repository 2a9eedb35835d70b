// src/fetch/mod.rs
// =============================================================================
// This module retrieves sitemap documents.
//
// Currently implements:
// - DocumentFetcher: the boundary the pipeline talks to
// - HttpFetcher: reqwest-based implementation with timeout and user agent
// =============================================================================

mod http;

pub use http::{DocumentFetcher, FetchedDocument, HttpFetcher};
