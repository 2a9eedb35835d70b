// src/lib.rs
// =============================================================================
// sitemap-sentinel: fetch an XML sitemap, check it against the sitemaps.org
// protocol and, when it is clean, submit its URLs to the Google Indexing API.
//
// Module map:
// - sitemap: document model and quick-xml parser
// - validate: protocol rules and the ValidationReport
// - fetch: DocumentFetcher boundary and the reqwest implementation
// - checker: optional reachability check of every listed URL
// - indexing: credentials, API client, retry policy and the Submitter
// - pipeline: ties the steps together into one run
// - config / logging / error: the ambient pieces
//
// The binary (src/main.rs) is a thin clap front end over pipeline::run.
// =============================================================================

pub mod checker;
pub mod config;
pub mod error;
pub mod fetch;
pub mod indexing;
pub mod logging;
pub mod pipeline;
pub mod sitemap;
pub mod validate;

pub use config::Config;
pub use error::{ApiError, CredentialError, ParseError, PipelineError, TransportError};
pub use pipeline::{run, ChildSitemapResult, PipelineResult};
