// src/validate/mod.rs
// =============================================================================
// This module checks a parsed sitemap against the sitemap protocol.
//
// Submodules:
// - report: ValidationIssue / ValidationReport (the output)
// - rules: the protocol caps and per-entry rules (the logic)
//
// A failed rule is data, not an error: callers always get a full report and
// decide for themselves (the pipeline refuses to submit when is_valid() is false).
// =============================================================================

mod report;
mod rules;

pub use report::{IssueCode, Scope, Severity, ValidationIssue, ValidationReport};
pub use rules::{
    same_site, validate, validate_fetched, MAX_DOCUMENT_BYTES, MAX_ENTRIES, MAX_LOCATION_CHARS,
};
