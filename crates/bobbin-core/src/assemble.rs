//! Record assembly.
//!
//! [`Assembler`] turns one raw tag match plus its decoded metadata into a
//! canonical [`Event`], applying the temporal normalizer and the
//! title/description and done-state precedence rules. [`Extractor`] drives
//! the per-document loop: pre-filter, scan, assemble with forward context,
//! and skip-with-warning on recoverable per-line errors.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::error::{ExtractError, ExtractResult};
use crate::event::{Event, Origin};
use crate::metadata::{DecodedMetadata, decode_metadata};
use crate::tag::{RawTagMatch, TagScanner, line_mentions_tag};
use crate::temporal::{DateResolver, parse_bool_token, resolve_date, resolve_temporal};

/// Placeholder title for lines whose content yields none.
pub const NO_TITLE: &str = "(untitled)";

/// Placeholder description when no delimiter splits one off.
pub const NO_DESCRIPTION: &str = "(no description)";

/// Per-line suffix joining continuation lines (markdown hard break).
const LINE_JOIN: &str = "  \n";

/// Metadata names consumed by assembly; everything else lands in `extra`.
const CONSUMED: &[&str] = &[
    "allday",
    "description",
    "done",
    "due",
    "duration",
    "end",
    "start",
    "title",
];

/// Extraction configuration, passed explicitly into every entry point.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Leading symbol identifying an event tag token.
    pub marker: char,
    /// Tag names (first dot-segment, marker stripped) that trigger parsing.
    pub event_tags: BTreeSet<String>,
    /// Character splitting title from description in trailing content.
    pub delimiter: char,
    /// Duration assigned to a due instant with no explicit span.
    pub default_duration: Duration,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            marker: '#',
            event_tags: ["event", "todo", "vevent", "vtodo"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            delimiter: '|',
            default_duration: Duration::minutes(30),
        }
    }
}

/// Assembles canonical events from raw tag matches.
pub struct Assembler<'a> {
    config: &'a ExtractConfig,
    resolver: &'a dyn DateResolver,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler over the given configuration and date resolver.
    pub fn new(config: &'a ExtractConfig, resolver: &'a dyn DateResolver) -> Self {
        Self { config, resolver }
    }

    /// Assembles one event.
    ///
    /// `following` holds the lines after the matched one, for multi-line
    /// description continuation.
    pub fn assemble(
        &self,
        raw: &RawTagMatch,
        meta: &DecodedMetadata,
        following: &[&str],
        origin: Origin,
        now: DateTime<Utc>,
    ) -> ExtractResult<Event> {
        let temporal = resolve_temporal(meta, now, self.resolver, self.config.default_duration)?;
        let (title, description) = self.split_title(raw, meta, following)?;
        let (done, done_at) = self.resolve_done(raw, meta, now);
        let tag = raw
            .tag
            .strip_prefix(self.config.marker)
            .unwrap_or(&raw.tag)
            .to_string();

        Ok(Event {
            start: temporal.start,
            duration: temporal.duration,
            all_day: temporal.all_day,
            title,
            description,
            tag: Some(tag),
            done,
            done_at,
            origin,
            extra: meta.remaining(CONSUMED),
        })
    }

    /// Splits title and description per the precedence rules.
    fn split_title(
        &self,
        raw: &RawTagMatch,
        meta: &DecodedMetadata,
        following: &[&str],
    ) -> ExtractResult<(String, String)> {
        let (title, description) = match (meta.get("title"), meta.get("description")) {
            (Some(title), Some(description)) => (title.to_string(), description.to_string()),
            (Some(_), None) | (None, Some(_)) => {
                return Err(ExtractError::InconsistentTitleFields);
            }
            (None, None) => {
                let content = raw.content.trim_end();
                if let Some(head) = content.strip_suffix(self.config.delimiter) {
                    (head.to_string(), continuation_description(following))
                } else if let Some(idx) = content.find(self.config.delimiter) {
                    let after = idx + self.config.delimiter.len_utf8();
                    (content[..idx].to_string(), content[after..].to_string())
                } else {
                    (content.to_string(), String::new())
                }
            }
        };

        let title = title.trim().to_string();
        let description = description.trim().to_string();
        Ok((
            if title.is_empty() {
                NO_TITLE.to_string()
            } else {
                title
            },
            if description.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                description
            },
        ))
    }

    /// Resolves the done state: explicit `done=` metadata, then the bare
    /// `done` flag, then the checkbox, then false.
    fn resolve_done(
        &self,
        raw: &RawTagMatch,
        meta: &DecodedMetadata,
        now: DateTime<Utc>,
    ) -> (bool, Option<DateTime<Utc>>) {
        if let Some(value) = meta.get("done") {
            match parse_bool_token(value) {
                Ok(done) => (done, None),
                // not a boolean: read it as "done as of this timestamp"
                Err(_) => (
                    true,
                    Some(resolve_date(value, now, self.resolver).to_utc()),
                ),
            }
        } else if meta.has_flag("done") {
            (true, None)
        } else if let Some(checked) = raw.checkbox {
            (checked, None)
        } else {
            (false, None)
        }
    }
}

/// Builds the continuation description: every immediately following line up
/// to (not including) the first blank one, common leading indentation
/// stripped, joined with a hard-break suffix.
fn continuation_description(following: &[&str]) -> String {
    let block: Vec<&str> = following
        .iter()
        .take_while(|line| !line.trim().is_empty())
        .copied()
        .collect();
    if block.is_empty() {
        return String::new();
    }
    let indent = common_indent(&block);
    block
        .iter()
        .map(|line| &line[indent..])
        .collect::<Vec<_>>()
        .join(LINE_JOIN)
}

/// Byte length of the whitespace prefix shared by all lines.
fn common_indent(lines: &[&str]) -> usize {
    let mut prefix = leading_whitespace(lines[0]);
    for line in &lines[1..] {
        let ws = leading_whitespace(line);
        let shared: usize = prefix
            .chars()
            .zip(ws.chars())
            .take_while(|(a, b)| a == b)
            .map(|(c, _)| c.len_utf8())
            .sum();
        prefix = &prefix[..shared];
    }
    prefix.len()
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Drives per-document extraction.
///
/// Per-line errors are recoverable: the offending line is skipped with a
/// warning and the rest of the document is still processed.
pub struct Extractor<'a> {
    config: ExtractConfig,
    scanner: TagScanner,
    resolver: &'a dyn DateResolver,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor, compiling the tag grammar for the configured
    /// marker.
    pub fn new(config: ExtractConfig, resolver: &'a dyn DateResolver) -> Self {
        let scanner = TagScanner::new(config.marker);
        Self {
            config,
            scanner,
            resolver,
        }
    }

    /// Extracts every event from a document's text.
    pub fn extract_text(&self, source: &str, text: &str, now: DateTime<Utc>) -> Vec<Event> {
        let lines: Vec<&str> = text.lines().collect();
        self.extract_lines(source, &lines, now)
    }

    /// Extracts every event from a document's lines.
    pub fn extract_lines(&self, source: &str, lines: &[&str], now: DateTime<Utc>) -> Vec<Event> {
        let assembler = Assembler::new(&self.config, self.resolver);
        let mut events = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if !line_mentions_tag(line, self.config.marker, &self.config.event_tags) {
                continue;
            }
            let Some(raw) = self.scanner.scan_line(line) else {
                continue;
            };
            if !self.is_event_tag(&raw.tag) {
                continue;
            }

            let line_number = (idx + 1) as u32;
            let meta = match raw.metadata.as_deref().map(decode_metadata).transpose() {
                Ok(meta) => meta.unwrap_or_default(),
                Err(err) => {
                    warn!(source, line = line_number, %err, "skipping line");
                    continue;
                }
            };

            let origin = Origin::new(source, line_number);
            match assembler.assemble(&raw, &meta, &lines[idx + 1..], origin, now) {
                Ok(event) => events.push(event),
                Err(err) => warn!(source, line = line_number, %err, "skipping line"),
            }
        }

        events
    }

    /// Eligibility: the tag's first dot-segment must be a configured event
    /// tag name.
    fn is_event_tag(&self, tag: &str) -> bool {
        let body = tag.strip_prefix(self.config.marker).unwrap_or(tag);
        let head = body.split('.').next().unwrap_or(body);
        self.config.event_tags.contains(head)
    }
}
