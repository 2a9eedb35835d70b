// src/sitemap/model.rs
// =============================================================================
// The typed form of a parsed sitemap.
//
// A sitemap is either a <urlset> (pages) or a <sitemapindex> (other sitemaps).
// The Entries enum makes it impossible to mix the two kinds in one document.
//
// Optional fields are stored as FieldValue<T>:
// - Parsed(T): the text matched the protocol grammar
// - Raw(String): it did not, we keep the text so the validator can report it
// =============================================================================

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Namespace URI of the sitemaps.org 0.9 protocol.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    UrlSet,
    SitemapIndex,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::UrlSet => f.write_str("urlset"),
            DocumentKind::SitemapIndex => f.write_str("sitemapindex"),
        }
    }
}

/// An optional sitemap value that may or may not follow the protocol grammar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue<T> {
    Parsed(T),
    Raw(String),
}

impl<T: FromStr> FieldValue<T> {
    /// Parses `text`, keeping it verbatim when it does not parse.
    pub fn from_text(text: &str) -> Self {
        match text.parse::<T>() {
            Ok(value) => FieldValue::Parsed(value),
            Err(_) => FieldValue::Raw(text.to_string()),
        }
    }
}

impl<T> FieldValue<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            FieldValue::Parsed(value) => Some(value),
            FieldValue::Raw(_) => None,
        }
    }
}

/// <changefreq> values defined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl FromStr for ChangeFrequency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(ChangeFrequency::Always),
            "hourly" => Ok(ChangeFrequency::Hourly),
            "daily" => Ok(ChangeFrequency::Daily),
            "weekly" => Ok(ChangeFrequency::Weekly),
            "monthly" => Ok(ChangeFrequency::Monthly),
            "yearly" => Ok(ChangeFrequency::Yearly),
            "never" => Ok(ChangeFrequency::Never),
            _ => Err(()),
        }
    }
}

/// A <lastmod> value in one of the W3C Datetime profiles.
///
/// Partial dates (`YYYY`, `YYYY-MM`) are widened to the first day of the
/// period. Times must carry a zone designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LastModified {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl FromStr for LastModified {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('T') {
            // RFC 3339 covers the seconds (and fractional seconds) profiles
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(LastModified::DateTime(dt));
            }
            // hh:mm without seconds is also allowed by W3C Datetime
            let normalized = match s.strip_suffix('Z') {
                Some(rest) => format!("{}+00:00", rest),
                None => s.to_string(),
            };
            return DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z")
                .map(LastModified::DateTime)
                .map_err(|_| ());
        }

        let parts: Vec<&str> = s.split('-').collect();
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !parts.iter().all(|p| all_digits(p)) || parts[0].len() != 4 {
            return Err(());
        }
        let date = match parts.as_slice() {
            [year] => NaiveDate::from_ymd_opt(year.parse().map_err(|_| ())?, 1, 1),
            [year, month] if month.len() == 2 => NaiveDate::from_ymd_opt(
                year.parse().map_err(|_| ())?,
                month.parse().map_err(|_| ())?,
                1,
            ),
            [_, month, day] if month.len() == 2 && day.len() == 2 => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            }
            _ => None,
        };
        date.map(LastModified::Date).ok_or(())
    }
}

/// One <url> entry of a <urlset>.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<FieldValue<LastModified>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<FieldValue<ChangeFrequency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<FieldValue<f64>>,
}

impl SitemapEntry {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }
}

/// One <sitemap> reference of a <sitemapindex>.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapIndexEntry {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<FieldValue<LastModified>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entries {
    Urls(Vec<SitemapEntry>),
    Sitemaps(Vec<SitemapIndexEntry>),
}

/// A parsed sitemap document. Immutable once built by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapDocument {
    pub entries: Entries,
    /// Namespace URI of the root element, if it had one
    pub namespace: Option<String>,
    /// Size of the raw bytes the document was parsed from
    pub byte_len: usize,
}

impl SitemapDocument {
    pub fn kind(&self) -> DocumentKind {
        match self.entries {
            Entries::Urls(_) => DocumentKind::UrlSet,
            Entries::Sitemaps(_) => DocumentKind::SitemapIndex,
        }
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Urls(urls) => urls.len(),
            Entries::Sitemaps(sitemaps) => sitemaps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// URL entries, empty for a sitemap index.
    pub fn urls(&self) -> &[SitemapEntry] {
        match &self.entries {
            Entries::Urls(urls) => urls,
            Entries::Sitemaps(_) => &[],
        }
    }

    /// Child sitemap references, empty for a urlset.
    pub fn sitemaps(&self) -> &[SitemapIndexEntry] {
        match &self.entries {
            Entries::Urls(_) => &[],
            Entries::Sitemaps(sitemaps) => sitemaps,
        }
    }

    /// Locations of all entries, in document order.
    pub fn locations(&self) -> Vec<&str> {
        match &self.entries {
            Entries::Urls(urls) => urls.iter().map(|e| e.location.as_str()).collect(),
            Entries::Sitemaps(sitemaps) => sitemaps.iter().map(|e| e.location.as_str()).collect(),
        }
    }
}
