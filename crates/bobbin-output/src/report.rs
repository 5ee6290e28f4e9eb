//! Markdown-style report encoding.
//!
//! Groups events by tag (one section per distinct tag, in order of first
//! appearance), sorts each group by start time with dateless events last,
//! and renders each event through a configurable line template.

use bobbin_core::{Event, time::distant_future};

use crate::template::{RenderFields, Template};

/// The default per-event line template.
pub const DEFAULT_LINE_TEMPLATE: &str =
    "- [{checkbox}] **{title}**  \n  {description}  \n  *origin:* {source} (line {line})  \n  *time:* {time}";

/// Section name for events without a tag.
const UNTAGGED: &str = "(untagged)";

/// Configuration for the report encoder.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Template rendered once per event.
    pub line_template: Template,
    /// Heading line opening the report.
    pub heading: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            line_template: Template::compile(DEFAULT_LINE_TEMPLATE)
                .expect("default template is valid"),
            heading: "# Events".to_string(),
        }
    }
}

/// Encodes events into a tag-grouped report.
pub fn encode_report(events: &[Event], config: &ReportConfig) -> String {
    let mut out = vec![config.heading.clone()];
    for (tag, group) in group_by_tag(events) {
        out.push(format!("\n## {tag}\n"));
        for event in group {
            out.push(config.line_template.render(&RenderFields::from_event(event)));
        }
    }
    out.join("\n")
}

/// Groups events by tag in first-appearance order, each group sorted by
/// start ascending with dateless events after all dated ones.
fn group_by_tag(events: &[Event]) -> Vec<(String, Vec<&Event>)> {
    let mut groups: Vec<(String, Vec<&Event>)> = Vec::new();
    for event in events {
        let tag = event.tag.clone().unwrap_or_else(|| UNTAGGED.to_string());
        match groups.iter_mut().find(|(name, _)| *name == tag) {
            Some((_, group)) => group.push(event),
            None => groups.push((tag, vec![event])),
        }
    }
    for (_, group) in &mut groups {
        group.sort_by_key(|event| {
            event
                .start
                .as_ref()
                .map(|t| t.to_utc_datetime())
                .unwrap_or_else(distant_future)
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobbin_core::{EventTime, Origin};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn event(tag: &str, title: &str, start: Option<DateTime<Utc>>, line: u32) -> Event {
        Event {
            start: start.map(EventTime::from_utc),
            duration: start.map(|_| Duration::minutes(30)),
            all_day: false,
            title: title.to_string(),
            description: "desc".to_string(),
            tag: Some(tag.to_string()),
            done: false,
            done_at: None,
            origin: Origin::new("notes.md", line),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn sections_in_first_appearance_order() {
        let events = vec![
            event("todo", "a", Some(utc(2024, 3, 5, 9, 0, 0)), 1),
            event("event", "b", Some(utc(2024, 3, 5, 10, 0, 0)), 2),
            event("todo", "c", Some(utc(2024, 3, 5, 11, 0, 0)), 3),
        ];
        let output = encode_report(&events, &ReportConfig::default());
        let todo_pos = output.find("## todo").unwrap();
        let event_pos = output.find("## event").unwrap();
        assert!(todo_pos < event_pos);
        assert!(output.starts_with("# Events"));
    }

    #[test]
    fn groups_sorted_by_start() {
        let events = vec![
            event("todo", "late", Some(utc(2024, 3, 5, 15, 0, 0)), 1),
            event("todo", "early", Some(utc(2024, 3, 5, 9, 0, 0)), 2),
        ];
        let output = encode_report(&events, &ReportConfig::default());
        assert!(output.find("early").unwrap() < output.find("late").unwrap());
    }

    #[test]
    fn dateless_sorted_last_regardless_of_input_order() {
        let events = vec![
            event("todo", "nodate", None, 1),
            event("todo", "dated", Some(utc(2024, 3, 5, 9, 0, 0)), 2),
        ];
        let output = encode_report(&events, &ReportConfig::default());
        assert!(output.find("dated").unwrap() < output.find("nodate").unwrap());
    }

    #[test]
    fn untagged_events_get_their_own_section() {
        let mut untagged = event("x", "loose", None, 1);
        untagged.tag = None;
        let output = encode_report(&[untagged], &ReportConfig::default());
        assert!(output.contains("## (untagged)"));
    }

    #[test]
    fn default_template_renders_origin_and_time() {
        let events = vec![event("todo", "standup", Some(utc(2024, 3, 5, 9, 0, 0)), 12)];
        let output = encode_report(&events, &ReportConfig::default());
        assert!(output.contains("- [ ] **standup**"));
        assert!(output.contains("*origin:* notes.md (line 12)"));
        assert!(output.contains("*time:* 2024-03-05 09:00 to 09:30 (duration: 0:30)"));
    }

    #[test]
    fn done_events_render_checked() {
        let mut done = event("todo", "shipped", None, 1);
        done.done = true;
        let output = encode_report(&[done], &ReportConfig::default());
        assert!(output.contains("- [x] **shipped**"));
    }

    #[test]
    fn custom_line_template() {
        let config = ReportConfig {
            line_template: Template::compile("* {title} [{time}]").unwrap(),
            ..Default::default()
        };
        let events = vec![event("todo", "standup", None, 1)];
        let output = encode_report(&events, &config);
        assert!(output.contains("* standup [no time specified]"));
    }

    #[test]
    fn empty_input_is_just_the_heading() {
        let output = encode_report(&[], &ReportConfig::default());
        assert_eq!(output, "# Events");
    }
}
