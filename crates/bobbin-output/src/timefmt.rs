//! Human-readable time formatting shared by the report and record encoders.

use bobbin_core::{Event, EventTime};
use chrono::Duration;

/// Rendered in place of a time range when an event has no start.
pub const NO_TIME: &str = "no time specified";

/// Formats a duration as `H:MM`, rounded to the nearest minute.
pub fn format_duration_hm(duration: Duration) -> String {
    let minutes = (duration.num_seconds() as f64 / 60.0).round() as i64;
    format!("{}:{:02}", minutes / 60, (minutes % 60).abs())
}

/// Formats an event's time range for display.
///
/// Same-day ranges show the date once (`2024-03-05 09:00 to 10:30`), ranges
/// spanning days show full timestamps on both ends, all-day events show the
/// date with an `(all day)` suffix, and dateless events a fixed string.
pub fn format_time_range(event: &Event) -> String {
    let Some(ref start) = event.start else {
        return NO_TIME.to_string();
    };

    match start {
        EventTime::AllDay(date) => format!("{} (all day)", date.format("%Y-%m-%d")),
        EventTime::DateTime(start_dt) => {
            let end = event
                .time_end()
                .map(|t| t.to_utc_datetime())
                .unwrap_or(*start_dt);
            let mut out = if start_dt.date_naive() == end.date_naive() {
                format!(
                    "{} to {}",
                    start_dt.format("%Y-%m-%d %H:%M"),
                    end.format("%H:%M")
                )
            } else {
                format!(
                    "{} to {}",
                    start_dt.format("%Y-%m-%d %H:%M"),
                    end.format("%Y-%m-%d %H:%M")
                )
            };
            if let Some(duration) = event.duration {
                out.push_str(&format!(" (duration: {})", format_duration_hm(duration)));
            }
            out
        }
    }
}
