//! iCalendar (RFC 5545) encoding.
//!
//! Emits one `VCALENDAR` container wrapping one `VEVENT` block per event.
//! All-day times render as date-only values (`DTSTART;VALUE=DATE:20240305`),
//! instants as UTC timestamps. Text values pass through the RFC 5545
//! escaping transform; an embedded newline becomes the two-character
//! sequence `\n`, never a literal control character.

use bobbin_core::{Event, EventTime};
use chrono::{DateTime, NaiveDate, Utc};

use crate::template::{RenderFields, Template};

/// Configuration for the calendar encoder.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Template rendered into SUMMARY.
    pub title_template: Template,
    /// Template rendered into DESCRIPTION.
    pub description_template: Template,
    /// Whether events without a start are emitted as all-day today.
    /// When false, dateless events are omitted.
    pub dateless_events_today: bool,
    /// The PRODID property value.
    pub product_id: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            title_template: Template::compile("{title}").expect("default template is valid"),
            description_template: Template::compile("{description}")
                .expect("default template is valid"),
            dateless_events_today: true,
            product_id: "-//bobbin 0.1//NONSGML bobbin//EN".to_string(),
        }
    }
}

/// Escapes text per RFC 5545: backslash, newline, semicolon, comma.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(';', "\\;")
        .replace(',', "\\,")
}

fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Renders a DTSTART/DTEND property, with the `VALUE=DATE` parameter for
/// all-day times.
fn time_property(name: &str, time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => format!("{name};VALUE=DATE:{}", format_date(date)),
        EventTime::DateTime(dt) => format!("{name}:{}", format_instant(dt)),
    }
}

/// Encodes events into a VCALENDAR document.
///
/// `now` supplies DTSTAMP/LAST-MODIFIED and the stand-in date for dateless
/// events. Lines are CRLF-joined.
pub fn encode_calendar(events: &[Event], now: DateTime<Utc>, config: &CalendarConfig) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", config.product_id),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];
    for event in events {
        if let Some(block) = encode_event(event, now, config) {
            lines.extend(block);
        }
    }
    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

fn encode_event(
    event: &Event,
    now: DateTime<Utc>,
    config: &CalendarConfig,
) -> Option<Vec<String>> {
    let (start, end) = match event.start {
        Some(ref start) => (start.clone(), event.time_end().unwrap_or_else(|| start.clone())),
        None if config.dateless_events_today => {
            let today = EventTime::from_date(now.date_naive());
            (today.clone(), today)
        }
        None => return None,
    };

    let fields = RenderFields::from_event(event);
    let stamp = format_instant(&now);

    Some(vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", event.uid()),
        format!("DTSTAMP:{stamp}"),
        format!("LAST-MODIFIED:{stamp}"),
        time_property("DTSTART", &start),
        time_property("DTEND", &end),
        format!(
            "SUMMARY:{}",
            escape_text(&config.title_template.render(&fields))
        ),
        format!(
            "DESCRIPTION:{}",
            escape_text(&config.description_template.render(&fields))
        ),
        "SEQUENCE:0".to_string(),
        "TRANSP:OPAQUE".to_string(),
        "STATUS:CONFIRMED".to_string(),
        "END:VEVENT".to_string(),
    ])
}
