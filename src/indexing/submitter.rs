// src/indexing/submitter.rs
// =============================================================================
// Submits validated sitemap entries to an indexing API, one at a time.
//
// For every entry, in document order:
// 1. Skip it if the same location was already handled in this run, or if the
//    link checker found it unreachable
// 2. Otherwise call the API, following the RetryPolicy state machine
// 3. Record exactly one outcome: Submitted, Skipped or Failed
//
// A failing entry never stops the run. ApiError stops here: it always ends up
// as the failure_reason of an outcome.
// =============================================================================

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::api::IndexingApi;
use super::retry::{RetryPolicy, Step};
use crate::sitemap::SitemapEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
    pub retry: RetryPolicy,
    /// Pause between two entries (not between retries of one entry)
    pub request_interval: Duration,
    /// Number of entries per progress log line
    pub batch_size: usize,
    /// Locations that must not be submitted (e.g. found unreachable)
    pub skip: HashSet<String>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_interval: Duration::ZERO,
            batch_size: 100,
            skip: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionOutcome {
    pub location: String,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Number of API calls made for this entry
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    outcomes: Vec<SubmissionOutcome>,
}

impl SubmissionReport {
    pub fn new(outcomes: Vec<SubmissionOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[SubmissionOutcome] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn count(&self, status: SubmissionStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn submitted(&self) -> usize {
        self.count(SubmissionStatus::Submitted)
    }

    pub fn skipped(&self) -> usize {
        self.count(SubmissionStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(SubmissionStatus::Failed)
    }
}

impl Serialize for SubmissionReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SubmissionReport", 4)?;
        state.serialize_field("submitted", &self.submitted())?;
        state.serialize_field("skipped", &self.skipped())?;
        state.serialize_field("failed", &self.failed())?;
        state.serialize_field("outcomes", &self.outcomes)?;
        state.end()
    }
}

/// Submits every entry through `api` and reports one outcome per entry.
///
/// The caller must have checked that the document validated. An empty
/// `entries` slice returns an empty report without touching the API.
pub async fn submit<A>(entries: &[SitemapEntry], api: &A, options: &SubmitOptions) -> SubmissionReport
where
    A: IndexingApi + ?Sized,
{
    let mut outcomes = Vec::with_capacity(entries.len());
    let mut handled: HashSet<&str> = HashSet::new();
    let batch_size = options.batch_size.max(1);
    let batches = (entries.len() + batch_size - 1) / batch_size;

    for (index, entry) in entries.iter().enumerate() {
        let location = entry.location.as_str();

        if index % batch_size == 0 {
            info!(
                "Processing batch {}/{} ({} URLs)",
                index / batch_size + 1,
                batches,
                entries.len()
            );
        }

        if !handled.insert(location) {
            outcomes.push(skipped(location, "duplicate of an earlier entry"));
            continue;
        }
        if options.skip.contains(location) {
            outcomes.push(skipped(location, "unreachable during link check"));
            continue;
        }

        if index > 0 && !options.request_interval.is_zero() {
            tokio::time::sleep(options.request_interval).await;
        }

        outcomes.push(submit_one(location, api, &options.retry).await);
    }

    let report = SubmissionReport::new(outcomes);
    info!(
        submitted = report.submitted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "submission finished"
    );
    report
}

async fn submit_one<A>(location: &str, api: &A, policy: &RetryPolicy) -> SubmissionOutcome
where
    A: IndexingApi + ?Sized,
{
    let mut attempt = 1;
    loop {
        let result = api.submit_url(location).await;
        match policy.step(attempt, &result) {
            Step::Submitted => {
                debug!(location, attempt, "submitted");
                return SubmissionOutcome {
                    location: location.to_string(),
                    status: SubmissionStatus::Submitted,
                    failure_reason: None,
                    attempts: attempt,
                };
            }
            Step::Retry {
                delay,
                next_attempt,
            } => {
                debug!(location, attempt, ?delay, "transient failure, retrying");
                tokio::time::sleep(delay).await;
                attempt = next_attempt;
            }
            Step::Failed { reason } => {
                warn!(location, %reason, "submission failed");
                return SubmissionOutcome {
                    location: location.to_string(),
                    status: SubmissionStatus::Failed,
                    failure_reason: Some(reason),
                    attempts: attempt,
                };
            }
        }
    }
}

fn skipped(location: &str, reason: &str) -> SubmissionOutcome {
    SubmissionOutcome {
        location: location.to_string(),
        status: SubmissionStatus::Skipped,
        failure_reason: Some(reason.to_string()),
        attempts: 0,
    }
}
