//! The durable event record.
//!
//! An [`Event`] is produced once by the record assembler (or reconstructed
//! by the record decoder) and is immutable thereafter.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::metadata::MetaValue;
use crate::time::EventTime;

/// Where an event was extracted from.
///
/// `(source, line)` is unique within one extraction run and is the sole
/// basis for the derived unique identifier exposed to the calendar encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    /// Identifier of the source document (its path, for file input).
    pub source: String,
    /// 1-based line number of the matched tag.
    pub line: u32,
}

impl Origin {
    /// Creates a new origin.
    pub fn new(source: impl Into<String>, line: u32) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

/// A fully assembled event record.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// When the event starts, if any temporal field resolved.
    pub start: Option<EventTime>,
    /// How long the event lasts.
    pub duration: Option<Duration>,
    /// Whether the event is date-only. When true, `start` carries no
    /// time-of-day and `duration`, if present, is a whole number of days.
    pub all_day: bool,
    /// The event title. Never empty; a placeholder stands in when the
    /// source line carried none.
    pub title: String,
    /// The event description, possibly multi-line.
    pub description: String,
    /// Dot-segmented tag path, marker character stripped (`todo.home`).
    pub tag: Option<String>,
    /// Whether the event is marked done.
    pub done: bool,
    /// When the event was done, if the done marker carried a timestamp.
    pub done_at: Option<DateTime<Utc>>,
    /// Immutable extraction identity.
    pub origin: Origin,
    /// Metadata keys and flags not consumed by assembly, preserved for
    /// round-trip serialization.
    pub extra: BTreeMap<String, MetaValue>,
}

impl Event {
    /// Returns the end of the event: `start + duration` when both are
    /// present, else `start`. An event without a start has no defined end.
    pub fn time_end(&self) -> Option<EventTime> {
        let start = self.start.as_ref()?;
        match self.duration {
            Some(duration) => match start {
                EventTime::DateTime(dt) => Some(EventTime::from_utc(*dt + duration)),
                EventTime::AllDay(date) => {
                    Some(EventTime::from_date(*date + duration))
                }
            },
            None => Some(start.clone()),
        }
    }

    /// The stable unique identifier derived from the origin.
    pub fn uid(&self) -> String {
        format!("{}:{}", self.origin.source, self.origin.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn sample_event() -> Event {
        Event {
            start: Some(EventTime::from_utc(utc(2024, 3, 5, 9, 0, 0))),
            duration: Some(Duration::minutes(90)),
            all_day: false,
            title: "standup".to_string(),
            description: "daily sync".to_string(),
            tag: Some("todo".to_string()),
            done: false,
            done_at: None,
            origin: Origin::new("notes/work.md", 12),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn uid_from_origin() {
        assert_eq!(sample_event().uid(), "notes/work.md:12");
    }

    #[test]
    fn end_is_start_plus_duration() {
        let event = sample_event();
        assert_eq!(
            event.time_end(),
            Some(EventTime::from_utc(utc(2024, 3, 5, 10, 30, 0)))
        );
    }

    #[test]
    fn end_without_duration_is_start() {
        let mut event = sample_event();
        event.duration = None;
        assert_eq!(event.time_end(), event.start);
    }

    #[test]
    fn end_without_start_is_undefined() {
        let mut event = sample_event();
        event.start = None;
        assert_eq!(event.time_end(), None);
    }

    #[test]
    fn all_day_end_advances_by_days() {
        let mut event = sample_event();
        event.all_day = true;
        event.start = Some(EventTime::from_date(
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        ));
        event.duration = Some(Duration::days(2));
        assert_eq!(
            event.time_end(),
            Some(EventTime::from_date(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
            ))
        );
    }
}
