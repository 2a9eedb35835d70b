// src/sitemap/mod.rs
// =============================================================================
// This module contains the sitemap document model and its XML parser.
//
// Submodules:
// - model: SitemapDocument, SitemapEntry, SitemapIndexEntry and field types
// - parser: Builds a SitemapDocument from raw bytes with quick-xml
// =============================================================================

mod model;
mod parser;

pub use model::{
    ChangeFrequency, DocumentKind, Entries, FieldValue, LastModified, SitemapDocument,
    SitemapEntry, SitemapIndexEntry, SITEMAP_NAMESPACE,
};
pub use parser::parse;
