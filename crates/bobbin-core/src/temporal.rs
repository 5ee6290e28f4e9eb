//! Temporal normalization.
//!
//! Resolves human-entered `due`/`start`/`end`/`duration`/`allday` metadata
//! into a consistent start/duration/all-day triple. Free-text date parsing
//! is delegated through [`DateResolver`]; this module owns only the
//! "today"/"tomorrow" synonyms and the reconciliation rules layered on top.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use tracing::warn;

use crate::error::{ExtractError, ExtractResult};
use crate::metadata::DecodedMetadata;
use crate::time::EventTime;

/// A resolved date expression: either a specific instant or a bare
/// calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A specific instant in UTC.
    Instant(DateTime<Utc>),
    /// A date with no time-of-day component.
    Date(NaiveDate),
}

impl Resolved {
    /// Converts to a UTC instant; dates convert to midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Instant(dt) => *dt,
            Self::Date(date) => date.and_hms_opt(0, 0, 0).expect("valid time").and_utc(),
        }
    }

    /// Returns the date portion.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Instant(dt) => dt.date_naive(),
            Self::Date(date) => *date,
        }
    }
}

/// The delegated natural-language date parsing capability.
///
/// Implementations resolve a free-text expression against a reference
/// instant. Returning `None` signals an unparseable expression; the
/// normalizer recovers by substituting the reference instant.
pub trait DateResolver {
    /// Resolves `text` against `now`.
    fn resolve(&self, text: &str, now: DateTime<Utc>) -> Option<Resolved>;
}

/// Built-in fixed-format resolver.
///
/// Handles ISO-style dates and datetimes, bare times (today at that time),
/// "yesterday", and relative phrases like `20 min` or `3 days ago`, which
/// resolve to that span *before* `now`.
#[derive(Debug)]
pub struct PatternResolver {
    relative: Regex,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

impl Default for PatternResolver {
    fn default() -> Self {
        Self {
            relative: Regex::new(
                r"^(?P<n>\d+)\s*(?P<unit>minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|wks?|w)(?:\s+ago)?$",
            )
            .expect("relative phrase regex is valid"),
        }
    }
}

impl DateResolver for PatternResolver {
    fn resolve(&self, text: &str, now: DateTime<Utc>) -> Option<Resolved> {
        let text = text.trim();
        let lower = text.to_ascii_lowercase();

        if lower == "yesterday" {
            let date = now.date_naive().pred_opt().expect("valid predecessor date");
            return Some(Resolved::Date(date));
        }

        if let Some(caps) = self.relative.captures(&lower) {
            let n: i64 = caps["n"].parse().ok()?;
            let span = match &caps["unit"][..1] {
                "m" => Duration::minutes(n),
                "h" => Duration::hours(n),
                "d" => Duration::days(n),
                "w" => Duration::weeks(n),
                _ => return None,
            };
            return Some(Resolved::Instant(now - span));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Resolved::Instant(dt.with_timezone(&Utc)));
        }

        for format in DATETIME_FORMATS {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, format) {
                return Some(Resolved::Instant(dt.and_utc()));
            }
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(Resolved::Date(date));
            }
        }

        if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M") {
            return Some(Resolved::Instant(now.date_naive().and_time(time).and_utc()));
        }

        None
    }
}

/// Parses a tri-state boolean token: {true,1,y,yes} / {false,0,n,no},
/// case-insensitive.
pub fn parse_bool_token(token: &str) -> ExtractResult<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "y" | "yes" => Ok(true),
        "false" | "0" | "n" | "no" => Ok(false),
        _ => Err(ExtractError::MalformedBoolean(token.to_string())),
    }
}

/// Resolves a date expression with the synonym and recovery rules applied.
///
/// "today" and "tomorrow" (and their short forms) are handled before
/// delegation and always yield bare dates. A delegated instant landing on
/// midnight collapses to its calendar date. Delegate failure is non-fatal:
/// the reference instant stands in and a warning is emitted.
pub fn resolve_date(text: &str, now: DateTime<Utc>, resolver: &dyn DateResolver) -> Resolved {
    match text.trim().to_ascii_lowercase().as_str() {
        "today" | "tod" => return Resolved::Date(now.date_naive()),
        "tomorrow" | "tom" | "tmro" | "tmr" => {
            let date = now.date_naive().succ_opt().expect("valid successor date");
            return Resolved::Date(date);
        }
        _ => {}
    }

    match resolver.resolve(text, now) {
        Some(Resolved::Instant(dt)) if dt.time() == NaiveTime::MIN => {
            Resolved::Date(dt.date_naive())
        }
        Some(resolved) => resolved,
        None => {
            warn!(text, "date resolution failed; substituting current time");
            Resolved::Instant(now)
        }
    }
}

/// The temporal shape recognized from metadata, before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalSpec {
    /// Only a due expression was given.
    Due(Resolved),
    /// Explicit start and end expressions.
    Range {
        /// Resolved start expression.
        start: Resolved,
        /// Resolved end expression.
        end: Resolved,
    },
    /// A start expression plus a duration phrase.
    StartPlusDuration {
        /// Resolved start expression.
        start: Resolved,
        /// The resolved span. Duration phrases are interpreted as the time
        /// elapsed from `now` to their resolution, a semantic kept for
        /// compatibility with historical output.
        duration: Duration,
    },
    /// No temporal fields present.
    Unspecified,
}

/// The canonical start/duration/all-day triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Temporal {
    /// Resolved start, if any.
    pub start: Option<EventTime>,
    /// Resolved duration, if any.
    pub duration: Option<Duration>,
    /// Whether the event is date-only.
    pub all_day: bool,
}

/// Classifies the metadata's temporal fields. First matching rule wins:
/// `due`, then `start`+`end`, then `start`+`duration`, else unspecified.
pub fn classify_temporal(
    meta: &DecodedMetadata,
    now: DateTime<Utc>,
    resolver: &dyn DateResolver,
) -> TemporalSpec {
    if let Some(due) = meta.get("due") {
        TemporalSpec::Due(resolve_date(due, now, resolver))
    } else if let (Some(start), Some(end)) = (meta.get("start"), meta.get("end")) {
        TemporalSpec::Range {
            start: resolve_date(start, now, resolver),
            end: resolve_date(end, now, resolver),
        }
    } else if let (Some(start), Some(duration)) = (meta.get("start"), meta.get("duration")) {
        TemporalSpec::StartPlusDuration {
            start: resolve_date(start, now, resolver),
            duration: now - resolve_date(duration, now, resolver).to_utc(),
        }
    } else {
        TemporalSpec::Unspecified
    }
}

/// Resolves metadata into the canonical temporal triple.
///
/// A due date yields an all-day event; a due instant picks up
/// `default_duration`. An explicit `allday` field overrides the computed
/// flag; forcing all-day downgrades the start to its date and truncates the
/// duration to whole days (sub-day durations collapse to none).
pub fn resolve_temporal(
    meta: &DecodedMetadata,
    now: DateTime<Utc>,
    resolver: &dyn DateResolver,
    default_duration: Duration,
) -> ExtractResult<Temporal> {
    let spec = classify_temporal(meta, now, resolver);

    let (start, duration, mut all_day) = match spec {
        TemporalSpec::Due(resolved @ Resolved::Date(_)) => (Some(resolved), None, true),
        TemporalSpec::Due(resolved) => (Some(resolved), Some(default_duration), false),
        TemporalSpec::Range { start, end } => {
            (Some(start), Some(end.to_utc() - start.to_utc()), false)
        }
        TemporalSpec::StartPlusDuration { start, duration } => {
            (Some(start), Some(duration), false)
        }
        TemporalSpec::Unspecified => (None, None, false),
    };

    if let Some(forced) = allday_override(meta)? {
        all_day = forced;
    }

    let start = start.map(|resolved| {
        if all_day {
            EventTime::from_date(resolved.date())
        } else {
            EventTime::from_utc(resolved.to_utc())
        }
    });

    let duration = if all_day {
        duration.and_then(|d| {
            let days = d.num_days();
            (days != 0).then(|| Duration::days(days))
        })
    } else {
        duration
    };

    Ok(Temporal {
        start,
        duration,
        all_day,
    })
}

/// Reads the explicit `allday` override: a key parses as a tri-state
/// boolean, a bare `.allday` flag counts as true.
fn allday_override(meta: &DecodedMetadata) -> ExtractResult<Option<bool>> {
    if let Some(value) = meta.get("allday") {
        Ok(Some(parse_bool_token(value)?))
    } else if meta.has_flag("allday") {
        Ok(Some(true))
    } else {
        Ok(None)
    }
}
