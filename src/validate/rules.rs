// src/validate/rules.rs
// =============================================================================
// The sitemap protocol rules.
//
// Document rules run first, then every entry in document order. Each rule
// pushes zero or more issues; nothing here touches the network or a clock,
// so validating the same document twice gives the same report.
//
// Site scoping:
// A sitemap may only list URLs of its own site. We compare scheme, host and
// effective port of each location with the sitemap's own URL.
// =============================================================================

use std::collections::HashMap;
use url::Url;

use super::report::{IssueCode, Scope, ValidationIssue, ValidationReport};
use crate::sitemap::{Entries, FieldValue, LastModified, SitemapDocument, SITEMAP_NAMESPACE};

/// Maximum number of entries in one sitemap or sitemap index.
pub const MAX_ENTRIES: usize = 50_000;

/// Maximum uncompressed size of one sitemap, in bytes (50 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 50 * 1024 * 1024;

/// Maximum length of a <loc> value.
pub const MAX_LOCATION_CHARS: usize = 2048;

/// Validates a parsed document that was fetched from `source_url`.
pub fn validate(document: &SitemapDocument, source_url: &Url) -> ValidationReport {
    validate_fetched(document, source_url, None)
}

/// Like [`validate`], also checking the `Content-Type` the server declared.
pub fn validate_fetched(
    document: &SitemapDocument,
    source_url: &Url,
    content_type: Option<&str>,
) -> ValidationReport {
    let mut issues = Vec::new();

    check_document(document, content_type, &mut issues);

    // First index at which each location was seen
    let mut seen: HashMap<&str, usize> = HashMap::new();

    match &document.entries {
        Entries::Urls(urls) => {
            for (index, entry) in urls.iter().enumerate() {
                let scope = Scope::Entry(index);
                check_location(&entry.location, source_url, scope, &mut issues);
                check_priority(entry.priority.as_ref(), scope, &mut issues);
                if let Some(FieldValue::Raw(text)) = &entry.change_frequency {
                    issues.push(ValidationIssue::warning(
                        scope,
                        IssueCode::UnknownChangeFrequency,
                        format!("unrecognized <changefreq> value '{}'", text),
                    ));
                }
                check_last_modified(entry.last_modified.as_ref(), scope, &mut issues);
                check_duplicate(&entry.location, index, &mut seen, &mut issues);
            }
        }
        Entries::Sitemaps(sitemaps) => {
            for (index, entry) in sitemaps.iter().enumerate() {
                let scope = Scope::Entry(index);
                check_location(&entry.location, source_url, scope, &mut issues);
                check_last_modified(entry.last_modified.as_ref(), scope, &mut issues);
                check_duplicate(&entry.location, index, &mut seen, &mut issues);
            }
        }
    }

    ValidationReport::new(issues)
}

fn check_document(
    document: &SitemapDocument,
    content_type: Option<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    if document.byte_len > MAX_DOCUMENT_BYTES {
        issues.push(ValidationIssue::error(
            Scope::Document,
            IssueCode::DocumentTooLarge,
            format!(
                "document is {} bytes, the limit is {} bytes (50 MiB)",
                document.byte_len, MAX_DOCUMENT_BYTES
            ),
        ));
    }

    if document.len() > MAX_ENTRIES {
        issues.push(ValidationIssue::error(
            Scope::Document,
            IssueCode::TooManyEntries,
            format!(
                "document has {} entries, the limit is {}",
                document.len(),
                MAX_ENTRIES
            ),
        ));
    }

    if let Some(content_type) = content_type {
        if !content_type.to_ascii_lowercase().contains("xml") {
            issues.push(ValidationIssue::warning(
                Scope::Document,
                IssueCode::UnexpectedContentType,
                format!("sitemap is not served as XML (Content-Type: {})", content_type),
            ));
        }
    }

    if document.namespace.as_deref() != Some(SITEMAP_NAMESPACE) {
        let found = document.namespace.as_deref().unwrap_or("none");
        issues.push(ValidationIssue::warning(
            Scope::Document,
            IssueCode::MissingNamespace,
            format!(
                "root element should declare xmlns=\"{}\" (found: {})",
                SITEMAP_NAMESPACE, found
            ),
        ));
    }

    if document.is_empty() {
        issues.push(ValidationIssue::warning(
            Scope::Document,
            IssueCode::EmptyDocument,
            format!("<{}> has no entries", document.kind()),
        ));
    }
}

fn check_location(location: &str, source: &Url, scope: Scope, issues: &mut Vec<ValidationIssue>) {
    // Url::parse repairs some malformed input, so the raw text is checked first
    if let Some(c) = location.chars().find(|c| must_be_escaped(*c)) {
        issues.push(ValidationIssue::error(
            scope,
            IssueCode::InvalidLocation,
            format!("'{}' contains {:?}, which must be percent-encoded", location, c),
        ));
        return;
    }

    let url = match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => url,
        Ok(_) => {
            issues.push(ValidationIssue::error(
                scope,
                IssueCode::InvalidLocation,
                format!("'{}' is not an http(s) URL", location),
            ));
            return;
        }
        Err(e) => {
            issues.push(ValidationIssue::error(
                scope,
                IssueCode::InvalidLocation,
                format!("'{}' is not an absolute URL: {}", location, e),
            ));
            return;
        }
    };

    if !has_authority_prefix(location, url.scheme()) {
        issues.push(ValidationIssue::error(
            scope,
            IssueCode::InvalidLocation,
            format!("'{}' must start with {}://", location, url.scheme()),
        ));
        return;
    }

    if location.chars().count() > MAX_LOCATION_CHARS {
        issues.push(ValidationIssue::error(
            scope,
            IssueCode::LocationTooLong,
            format!("location is longer than {} characters", MAX_LOCATION_CHARS),
        ));
    }

    if !same_site(&url, source) {
        issues.push(ValidationIssue::error(
            scope,
            IssueCode::OutOfScopeLocation,
            format!("'{}' is outside the sitemap's site {}", location, site_of(source)),
        ));
    }
}

// Characters a <loc> may not carry unescaped (RFC 3986 plus whitespace)
fn must_be_escaped(c: char) -> bool {
    !c.is_ascii()
        || c.is_ascii_whitespace()
        || c.is_ascii_control()
        || matches!(c, '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
}

// "https:example.com" parses, but is not a well-formed absolute URL
fn has_authority_prefix(location: &str, scheme: &str) -> bool {
    location
        .get(..scheme.len() + 3)
        .map_or(false, |prefix| {
            prefix[..scheme.len()].eq_ignore_ascii_case(scheme) && &prefix[scheme.len()..] == "://"
        })
}

/// Scheme, host and effective port all match.
pub fn same_site(url: &Url, source: &Url) -> bool {
    url.scheme() == source.scheme()
        && url.host_str() == source.host_str()
        && url.port_or_known_default() == source.port_or_known_default()
}

fn site_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        _ => url.to_string(),
    }
}

fn check_priority(priority: Option<&FieldValue<f64>>, scope: Scope, issues: &mut Vec<ValidationIssue>) {
    match priority {
        Some(FieldValue::Raw(text)) => issues.push(ValidationIssue::error(
            scope,
            IssueCode::InvalidPriority,
            format!("<priority> '{}' is not a number", text),
        )),
        Some(FieldValue::Parsed(value)) if !(0.0..=1.0).contains(value) => {
            issues.push(ValidationIssue::error(
                scope,
                IssueCode::PriorityOutOfRange,
                format!("<priority> {} is outside 0.0..=1.0", value),
            ))
        }
        _ => {}
    }
}

fn check_last_modified(
    last_modified: Option<&FieldValue<LastModified>>,
    scope: Scope,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(FieldValue::Raw(text)) = last_modified {
        issues.push(ValidationIssue::warning(
            scope,
            IssueCode::InvalidLastModified,
            format!("<lastmod> '{}' is not a W3C Datetime", text),
        ));
    }
}

fn check_duplicate<'a>(
    location: &'a str,
    index: usize,
    seen: &mut HashMap<&'a str, usize>,
    issues: &mut Vec<ValidationIssue>,
) {
    match seen.get(location) {
        Some(first) => issues.push(ValidationIssue::warning(
            Scope::Entry(index),
            IssueCode::DuplicateLocation,
            format!("'{}' is already listed at entry #{}", location, first),
        )),
        None => {
            seen.insert(location, index);
        }
    }
}
