// src/sitemap/parser.rs
// =============================================================================
// This module turns raw sitemap bytes into a SitemapDocument.
//
// We use the `quick-xml` crate which:
// - Reads XML as a stream of events (Start, Text, End, ...)
// - Resolves namespace prefixes for us (NsReader)
// - Never builds a full DOM, so 50 MB documents stay cheap
//
// Parsing rules:
// - The root must be <urlset> or <sitemapindex>, whatever its namespace
// - Children count only when they share the root's namespace (or have none),
//   so extension elements like <image:loc> are ignored
// - Unknown elements are ignored at any depth (forward compatibility)
// - An entry without a <loc> is a hard error
// =============================================================================

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::model::{Entries, FieldValue, SitemapDocument, SitemapEntry, SitemapIndexEntry};
use crate::error::ParseError;

// Depth of the field elements (<loc>, <lastmod>, ...) below the root
const FIELD_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Location,
    LastModified,
    ChangeFrequency,
    Priority,
}

// Text collected for the entry currently being read
#[derive(Debug, Default)]
struct PendingEntry {
    location: Option<String>,
    last_modified: Option<String>,
    change_frequency: Option<String>,
    priority: Option<String>,
}

impl PendingEntry {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Location => &mut self.location,
            Field::LastModified => &mut self.last_modified,
            Field::ChangeFrequency => &mut self.change_frequency,
            Field::Priority => &mut self.priority,
        }
    }
}

struct Root {
    is_index: bool,
    namespace: Option<Vec<u8>>,
}

impl Root {
    fn entry_tag(&self) -> &'static str {
        if self.is_index {
            "sitemap"
        } else {
            "url"
        }
    }

    fn field_for(&self, name: &str) -> Option<Field> {
        match name {
            "loc" => Some(Field::Location),
            "lastmod" => Some(Field::LastModified),
            "changefreq" if !self.is_index => Some(Field::ChangeFrequency),
            "priority" if !self.is_index => Some(Field::Priority),
            _ => None,
        }
    }

    fn owns(&self, ns: &ResolveResult) -> bool {
        match (ns, &self.namespace) {
            (ResolveResult::Unbound, _) => true,
            (ResolveResult::Bound(Namespace(uri)), Some(root_ns)) => *uri == root_ns.as_slice(),
            _ => false,
        }
    }
}

/// Parses a sitemap or sitemap index.
///
/// Fails when the bytes are not well-formed XML, when the root element is
/// neither `<urlset>` nor `<sitemapindex>`, or when an entry lacks `<loc>`.
pub fn parse(raw: &[u8]) -> Result<SitemapDocument, ParseError> {
    let mut reader = NsReader::from_reader(raw);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<Root> = None;
    let mut finished = false;
    let mut depth = 0usize;
    let mut pending: Option<PendingEntry> = None;
    let mut field: Option<Field> = None;

    let mut urls = Vec::new();
    let mut sitemaps = Vec::new();

    loop {
        let (ns, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(pair) => pair,
            Err(e) => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })
            }
        };
        let root_namespace = match (&root, &ns) {
            (None, ResolveResult::Bound(Namespace(uri))) => Some(uri.to_vec()),
            _ => None,
        };
        let in_document_ns = root.as_ref().map_or(false, |r| r.owns(&ns));

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

                if finished {
                    return Err(ParseError::TrailingContent);
                }

                if let Some(r) = root.as_ref() {
                    if depth == 1 && in_document_ns && name == r.entry_tag() {
                        if is_empty {
                            let index = urls.len() + sitemaps.len();
                            return Err(ParseError::MissingLocation { index });
                        }
                        pending = Some(PendingEntry::default());
                    } else if depth == FIELD_DEPTH && in_document_ns && !is_empty {
                        // The first occurrence of a field wins, repeats are ignored
                        field = match (pending.as_mut(), r.field_for(&name)) {
                            (Some(entry), Some(f)) => {
                                let slot = entry.slot(f);
                                if slot.is_none() {
                                    *slot = Some(String::new());
                                    Some(f)
                                } else {
                                    None
                                }
                            }
                            _ => None,
                        };
                    }
                } else {
                    let is_index = match name.as_str() {
                        "urlset" => false,
                        "sitemapindex" => true,
                        _ => return Err(ParseError::UnrecognizedRoot(name)),
                    };
                    root = Some(Root {
                        is_index,
                        namespace: root_namespace,
                    });
                    finished = is_empty;
                }

                if !is_empty {
                    depth += 1;
                }
            }

            Event::Text(ref e) => {
                if depth == 0 {
                    return Err(if finished {
                        ParseError::TrailingContent
                    } else {
                        ParseError::Malformed {
                            position: reader.buffer_position() as u64,
                            message: "text before the root element".to_string(),
                        }
                    });
                }
                if depth == FIELD_DEPTH + 1 {
                    let text = e.unescape().map_err(|err| ParseError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    append_text(&mut pending, field, &text);
                }
            }

            Event::CData(ref e) => {
                if depth == FIELD_DEPTH + 1 {
                    append_text(&mut pending, field, &String::from_utf8_lossy(e));
                }
            }

            Event::End(_) => {
                depth = depth.saturating_sub(1);
                match depth {
                    FIELD_DEPTH => field = None,
                    1 => {
                        if let Some(entry) = pending.take() {
                            let index = urls.len() + sitemaps.len();
                            let is_index = root.as_ref().map_or(false, |r| r.is_index);
                            if is_index {
                                sitemaps.push(finish_index_entry(entry, index)?);
                            } else {
                                urls.push(finish_url_entry(entry, index)?);
                            }
                        }
                    }
                    0 => finished = true,
                    _ => {}
                }
            }

            Event::Eof => {
                if root.is_none() {
                    return Err(ParseError::Empty);
                }
                if depth != 0 {
                    return Err(ParseError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: "unexpected end of document".to_string(),
                    });
                }
                break;
            }

            // Declarations, comments, processing instructions, doctypes
            _ => {}
        }

        buf.clear();
    }

    let root = root.ok_or(ParseError::Empty)?;
    let entries = if root.is_index {
        Entries::Sitemaps(sitemaps)
    } else {
        Entries::Urls(urls)
    };

    Ok(SitemapDocument {
        entries,
        namespace: root
            .namespace
            .map(|ns| String::from_utf8_lossy(&ns).into_owned()),
        byte_len: raw.len(),
    })
}

fn append_text(pending: &mut Option<PendingEntry>, field: Option<Field>, text: &str) {
    if let (Some(entry), Some(f)) = (pending.as_mut(), field) {
        entry.slot(f).get_or_insert_with(String::new).push_str(text);
    }
}

// Trimmed, non-empty text or nothing
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn finish_url_entry(entry: PendingEntry, index: usize) -> Result<SitemapEntry, ParseError> {
    let location = clean(entry.location).ok_or(ParseError::MissingLocation { index })?;
    Ok(SitemapEntry {
        location,
        last_modified: clean(entry.last_modified).map(|v| FieldValue::from_text(&v)),
        change_frequency: clean(entry.change_frequency).map(|v| FieldValue::from_text(&v)),
        priority: clean(entry.priority).map(|v| FieldValue::from_text(&v)),
    })
}

fn finish_index_entry(entry: PendingEntry, index: usize) -> Result<SitemapIndexEntry, ParseError> {
    let location = clean(entry.location).ok_or(ParseError::MissingLocation { index })?;
    Ok(SitemapIndexEntry {
        location,
        last_modified: clean(entry.last_modified).map(|v| FieldValue::from_text(&v)),
    })
}
