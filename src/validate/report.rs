// src/validate/report.rs
// =============================================================================
// The result types of validation.
//
// A ValidationIssue is one broken rule. A ValidationReport is the ordered list
// of issues for one document: document-scope issues first, then per-entry
// issues in document order.
// =============================================================================

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Where an issue was found: the whole document or one entry (by index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Document,
    Entry(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Document => f.write_str("document"),
            Scope::Entry(index) => write!(f, "entry #{}", index),
        }
    }
}

/// Stable identifiers of the validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    DocumentTooLarge,
    TooManyEntries,
    UnexpectedContentType,
    MissingNamespace,
    EmptyDocument,
    InvalidLocation,
    LocationTooLong,
    OutOfScopeLocation,
    InvalidPriority,
    PriorityOutOfRange,
    UnknownChangeFrequency,
    InvalidLastModified,
    DuplicateLocation,
    ChildNotExpanded,
    ChildUnavailable,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::DocumentTooLarge => "document-too-large",
            IssueCode::TooManyEntries => "too-many-entries",
            IssueCode::UnexpectedContentType => "unexpected-content-type",
            IssueCode::MissingNamespace => "missing-namespace",
            IssueCode::EmptyDocument => "empty-document",
            IssueCode::InvalidLocation => "invalid-location",
            IssueCode::LocationTooLong => "location-too-long",
            IssueCode::OutOfScopeLocation => "out-of-scope-location",
            IssueCode::InvalidPriority => "invalid-priority",
            IssueCode::PriorityOutOfRange => "priority-out-of-range",
            IssueCode::UnknownChangeFrequency => "unknown-change-frequency",
            IssueCode::InvalidLastModified => "invalid-last-modified",
            IssueCode::DuplicateLocation => "duplicate-location",
            IssueCode::ChildNotExpanded => "child-not-expanded",
            IssueCode::ChildUnavailable => "child-unavailable",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub scope: Scope,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(scope: Scope, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            scope,
            code,
            message: message.into(),
        }
    }

    pub fn warning(scope: Scope, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            scope,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Adds a document-scope issue after the existing document-scope issues.
    pub fn with_document_issue(mut self, issue: ValidationIssue) -> Self {
        let position = self
            .issues
            .iter()
            .position(|i| i.scope != Scope::Document)
            .unwrap_or(self.issues.len());
        self.issues.insert(position, ValidationIssue { scope: Scope::Document, ..issue });
        self
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// True when no issue has ERROR severity. Warnings never affect this.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 4)?;
        state.serialize_field("is_valid", &self.is_valid())?;
        state.serialize_field("error_count", &self.error_count())?;
        state.serialize_field("warning_count", &self.warning_count())?;
        state.serialize_field("issues", &self.issues)?;
        state.end()
    }
}
