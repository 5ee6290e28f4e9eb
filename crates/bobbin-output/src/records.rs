//! Flat record serialization with a reversible load.
//!
//! [`EventRecord`] carries every first-class event field plus derived
//! read-only fields (numeric timestamps and readable strings). The decoder
//! reconstructs an [`Event`] from exactly the first-class fields, so
//! `decode(encode(e))` equals `e` on all of them.

use std::collections::BTreeMap;

use bobbin_core::{Event, EventTime, MetaValue, Origin};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timefmt::format_duration_hm;

/// Record decoding errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Malformed JSON or a record missing required fields.
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric timestamp outside the representable range.
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

/// A flat, serializable view of one event.
///
/// `*_ts` fields are epoch seconds; their string twins are derived,
/// read-only renderings ignored by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Derived unique identifier (`source:line`).
    pub uid: String,
    /// Origin document identifier.
    pub source: String,
    /// Origin line number.
    pub line: u32,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Dot-segmented tag path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Done state.
    pub done: bool,
    /// When the event was done, epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at_ts: Option<i64>,
    /// When the event was done, readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<String>,
    /// Whether the event is date-only.
    pub all_day: bool,
    /// Event start, epoch seconds (midnight UTC for all-day events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<i64>,
    /// Event start, readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Event end, epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<i64>,
    /// Event end, readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
    /// Duration, readable (`H:MM`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Unconsumed metadata carried through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, MetaValue>,
}

impl EventRecord {
    /// Builds a record from an event, deriving the read-only fields.
    pub fn from_event(event: &Event) -> Self {
        let start_dt = event.start.as_ref().map(EventTime::to_utc_datetime);
        let end = event.time_end();
        let end_dt = end.as_ref().map(EventTime::to_utc_datetime);

        Self {
            uid: event.uid(),
            source: event.origin.source.clone(),
            line: event.origin.line,
            title: event.title.clone(),
            description: event.description.clone(),
            tag: event.tag.clone(),
            done: event.done,
            done_at_ts: event.done_at.map(|dt| dt.timestamp()),
            done_at: event.done_at.map(readable_instant),
            all_day: event.all_day,
            start_ts: start_dt.map(|dt| dt.timestamp()),
            start: event.start.as_ref().map(readable_time),
            end_ts: end_dt.map(|dt| dt.timestamp()),
            end: end.as_ref().map(readable_time),
            duration_secs: event.duration.map(|d| d.num_seconds()),
            duration: event.duration.map(format_duration_hm),
            extra: event.extra.clone(),
        }
    }

    /// Reconstructs the event from the first-class fields, re-deriving
    /// the start variant from the stored all-day flag.
    pub fn into_event(self) -> Result<Event, RecordError> {
        let start = self
            .start_ts
            .map(|ts| {
                parse_timestamp(ts).map(|dt| {
                    if self.all_day {
                        EventTime::from_date(dt.date_naive())
                    } else {
                        EventTime::from_utc(dt)
                    }
                })
            })
            .transpose()?;
        let done_at = self.done_at_ts.map(parse_timestamp).transpose()?;

        Ok(Event {
            start,
            duration: self.duration_secs.map(Duration::seconds),
            all_day: self.all_day,
            title: self.title,
            description: self.description,
            tag: self.tag,
            done: self.done,
            done_at,
            origin: Origin::new(self.source, self.line),
            extra: self.extra,
        })
    }
}

fn parse_timestamp(secs: i64) -> Result<DateTime<Utc>, RecordError> {
    DateTime::from_timestamp(secs, 0).ok_or(RecordError::TimestampOutOfRange(secs))
}

fn readable_time(time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => date.format("%Y-%m-%d").to_string(),
        EventTime::DateTime(dt) => readable_instant(*dt),
    }
}

fn readable_instant(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Encodes events as one pretty-printed JSON array.
pub fn encode_json(events: &[Event]) -> Result<String, RecordError> {
    let records: Vec<EventRecord> = events.iter().map(EventRecord::from_event).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Encodes events as newline-delimited JSON, one record per line.
pub fn encode_ndjson(events: &[Event]) -> Result<String, RecordError> {
    let mut lines = Vec::with_capacity(events.len());
    for event in events {
        lines.push(serde_json::to_string(&EventRecord::from_event(event))?);
    }
    Ok(lines.join("\n"))
}

/// Decodes a JSON array of records back into events.
pub fn decode_json(text: &str) -> Result<Vec<Event>, RecordError> {
    let records: Vec<EventRecord> = serde_json::from_str(text)?;
    records.into_iter().map(EventRecord::into_event).collect()
}

/// Decodes newline-delimited JSON records back into events. Blank lines
/// are ignored.
pub fn decode_ndjson(text: &str) -> Result<Vec<Event>, RecordError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str::<EventRecord>(line)?.into_event())
        .collect()
}
