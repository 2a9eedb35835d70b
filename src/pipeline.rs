// src/pipeline.rs
// =============================================================================
// The check-and-submit pipeline: one run against one sitemap URL.
//
// Steps:
// 1. Check the sitemap URL (absolute http/https)
// 2. Fetch, parse and validate the document
// 3. Optionally expand a sitemap index one level deep
// 4. Optionally check every listed URL for reachability
// 5. Optionally submit the URLs, but only when everything validated
//
// Fetch/parse failures of the root document and credential failures are fatal
// (PipelineError). Everything found after that is data in the PipelineResult.
// =============================================================================

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

use crate::checker::{check_links, LinkCheckOptions, LinkCheckResult};
use crate::config::Config;
use crate::error::PipelineError;
use crate::fetch::{DocumentFetcher, FetchedDocument};
use crate::indexing::{submit, CredentialProvider, SubmissionReport};
use crate::sitemap::{parse, DocumentKind, SitemapEntry};
use crate::validate::{validate_fetched, IssueCode, Scope, ValidationIssue, ValidationReport};

/// What happened to one child of an expanded sitemap index.
#[derive(Debug, Clone, Serialize)]
pub struct ChildSitemapResult {
    pub sitemap_url: String,
    /// None when the child could not be fetched or parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,
    pub entry_count: usize,
    pub validation: ValidationReport,
}

impl ChildSitemapResult {
    fn unavailable(sitemap_url: &str, reason: String) -> Self {
        warn!(url = sitemap_url, %reason, "child sitemap unavailable");
        Self {
            sitemap_url: sitemap_url.to_string(),
            kind: None,
            entry_count: 0,
            validation: ValidationReport::new(vec![ValidationIssue::error(
                Scope::Document,
                IssueCode::ChildUnavailable,
                reason,
            )]),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub sitemap_url: String,
    /// Set when the sitemap was served from another URL after redirects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_to: Option<String>,
    pub kind: DocumentKind,
    pub entry_count: usize,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildSitemapResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_checks: Option<Vec<LinkCheckResult>>,
    /// Present only when submission was requested and validation passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionReport>,
}

impl PipelineResult {
    /// Root document valid, and every expanded child fetched, parsed and valid.
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid() && self.children.iter().all(ChildSitemapResult::is_valid)
    }

    /// True for a sitemap index whose children were not fetched.
    pub fn index_not_expanded(&self) -> bool {
        self.kind == DocumentKind::SitemapIndex && self.children.is_empty() && self.entry_count > 0
    }

    /// 0 when valid, 1 otherwise. Per-entry submission failures do not count.
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }
}

/// Runs the pipeline for `sitemap_url`.
pub async fn run<F, P>(
    sitemap_url: &str,
    fetcher: &F,
    credentials: &P,
    config: &Config,
) -> Result<PipelineResult, PipelineError>
where
    F: DocumentFetcher + ?Sized,
    P: CredentialProvider + ?Sized,
{
    let source = parse_sitemap_url(sitemap_url)?;

    // A usage error, so report it before any network traffic
    if config.submit && config.credentials_path.is_none() {
        return Err(PipelineError::MissingCredentials);
    }

    info!(url = %source, "fetching sitemap");
    let fetched = fetcher.fetch(source.as_str()).await?;
    let document = parse(&fetched.bytes)?;
    let site = served_from(&source, &fetched);
    let validation = validate_fetched(&document, &site, fetched.content_type.as_deref());
    info!(
        kind = %document.kind(),
        entries = document.len(),
        errors = validation.error_count(),
        warnings = validation.warning_count(),
        "sitemap validated"
    );

    let mut children = Vec::new();
    let mut entries: Vec<SitemapEntry> = document.urls().to_vec();

    if document.kind() == DocumentKind::SitemapIndex {
        if config.expand_index {
            let mut expanded = HashSet::new();
            for child in document.sitemaps() {
                if !expanded.insert(child.location.as_str()) {
                    continue;
                }
                let (result, child_entries) = expand_child(&child.location, fetcher).await;
                children.push(result);
                entries.extend(child_entries);
            }
        } else if config.submit {
            warn!("sitemap index not expanded, so no URLs will be submitted (use --expand-index)");
        } else {
            info!("sitemap index not expanded (use --expand-index to follow children)");
        }
    }

    let link_checks = if config.check_links {
        let options = LinkCheckOptions {
            timeout: config.request_timeout,
            user_agent: config.user_agent.clone(),
            max_workers: config.max_workers,
        };
        Some(check_links(unique_locations(&entries), &options).await?)
    } else {
        None
    };

    let mut result = PipelineResult {
        sitemap_url: source.to_string(),
        redirected_to: (site != source).then(|| site.to_string()),
        kind: document.kind(),
        entry_count: document.len(),
        validation,
        children,
        link_checks,
        submission: None,
    };

    if !config.submit {
        return Ok(result);
    }
    if !result.is_valid() {
        warn!("validation failed; nothing was submitted");
        return Ok(result);
    }

    let path = config
        .credentials_path
        .as_deref()
        .ok_or(PipelineError::MissingCredentials)?;
    let api = credentials.authenticate(path, &site).await?;

    let mut options = config.submit_options.clone();
    if let Some(checks) = &result.link_checks {
        options
            .skip
            .extend(checks.iter().filter(|c| !c.is_ok()).map(|c| c.url.clone()));
    }

    result.submission = Some(submit(&entries, &api, &options).await);
    Ok(result)
}

fn parse_sitemap_url(sitemap_url: &str) -> Result<Url, PipelineError> {
    let invalid = |reason: String| PipelineError::InvalidUrl {
        url: sitemap_url.to_string(),
        reason,
    };
    let url = Url::parse(sitemap_url.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(invalid("missing host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

// Fetches, parses and validates one child of a sitemap index. Never fails:
// problems become a ChildUnavailable issue on the child.
async fn expand_child<F>(location: &str, fetcher: &F) -> (ChildSitemapResult, Vec<SitemapEntry>)
where
    F: DocumentFetcher + ?Sized,
{
    let url = match Url::parse(location) {
        Ok(url) => url,
        Err(e) => {
            return (
                ChildSitemapResult::unavailable(location, format!("invalid location: {}", e)),
                Vec::new(),
            )
        }
    };

    let fetched = match fetcher.fetch(url.as_str()).await {
        Ok(fetched) => fetched,
        Err(e) => {
            return (
                ChildSitemapResult::unavailable(location, format!("fetch failed: {}", e)),
                Vec::new(),
            )
        }
    };

    let document = match parse(&fetched.bytes) {
        Ok(document) => document,
        Err(e) => {
            return (
                ChildSitemapResult::unavailable(location, format!("parse failed: {}", e)),
                Vec::new(),
            )
        }
    };

    let site = served_from(&url, &fetched);
    let mut validation = validate_fetched(&document, &site, fetched.content_type.as_deref());
    if document.kind() == DocumentKind::SitemapIndex {
        validation = validation.with_document_issue(ValidationIssue::warning(
            Scope::Document,
            IssueCode::ChildNotExpanded,
            "nested sitemap index is not expanded",
        ));
    }
    info!(
        url = location,
        entries = document.len(),
        errors = validation.error_count(),
        "child sitemap validated"
    );

    let result = ChildSitemapResult {
        sitemap_url: location.to_string(),
        kind: Some(document.kind()),
        entry_count: document.len(),
        validation,
    };
    (result, document.urls().to_vec())
}

// Scoping follows redirects: entries must belong to the site that served the document
fn served_from(requested: &Url, fetched: &FetchedDocument) -> Url {
    fetched
        .final_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .unwrap_or_else(|| requested.clone())
}

// Locations in first-seen order, without repeats
fn unique_locations(entries: &[SitemapEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.location.as_str()))
        .map(|e| e.location.clone())
        .collect()
}
