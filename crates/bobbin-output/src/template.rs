//! Closed-placeholder output templates.
//!
//! Template strings reference a fixed set of named placeholders resolved
//! from an event's serializable fields. Templates are compiled when
//! configuration is loaded, so an unknown placeholder name fails there
//! rather than per record at render time.

use bobbin_core::Event;
use thiserror::Error;

use crate::timefmt::format_time_range;

/// The closed set of placeholder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{title}` — the event title.
    Title,
    /// `{description}` — the event description.
    Description,
    /// `{tag}` — the dot-segmented tag path, empty when untagged.
    Tag,
    /// `{source}` — the origin document identifier.
    Source,
    /// `{line}` — the origin line number.
    Line,
    /// `{uid}` — the derived unique identifier.
    Uid,
    /// `{time}` — the human-readable time range.
    Time,
    /// `{checkbox}` — the completion glyph, `x` or a space.
    Checkbox,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "tag" => Some(Self::Tag),
            "source" => Some(Self::Source),
            "line" => Some(Self::Line),
            "uid" => Some(Self::Uid),
            "time" => Some(Self::Time),
            "checkbox" => Some(Self::Checkbox),
            _ => None,
        }
    }
}

/// Template compilation errors, surfaced at configuration-load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder name outside the closed set.
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    /// A `{` with no matching `}`.
    #[error("unterminated placeholder after {0:?}")]
    Unterminated(String),
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A compiled output template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compiles a template string, rejecting unknown placeholder names.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(TemplateError::Unterminated(rest[..open].to_string()));
            };
            let name = &after[..close];
            let placeholder = Placeholder::from_name(name)
                .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
            segments.push(Segment::Field(placeholder));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Renders the template against resolved fields.
    pub fn render(&self, fields: &RenderFields) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(placeholder) => out.push_str(fields.get(*placeholder)),
            }
        }
        out
    }
}

/// An event's fields resolved to display strings.
#[derive(Debug, Clone)]
pub struct RenderFields {
    /// The event title.
    pub title: String,
    /// The event description.
    pub description: String,
    /// The tag path, empty when untagged.
    pub tag: String,
    /// The origin document identifier.
    pub source: String,
    /// The origin line number.
    pub line: String,
    /// The derived unique identifier.
    pub uid: String,
    /// The human-readable time range.
    pub time: String,
    /// The completion glyph.
    pub checkbox: String,
}

impl RenderFields {
    /// Resolves every placeholder value from an event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            tag: event.tag.clone().unwrap_or_default(),
            source: event.origin.source.clone(),
            line: event.origin.line.to_string(),
            uid: event.uid(),
            time: format_time_range(event),
            checkbox: if event.done { "x" } else { " " }.to_string(),
        }
    }

    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Title => &self.title,
            Placeholder::Description => &self.description,
            Placeholder::Tag => &self.tag,
            Placeholder::Source => &self.source,
            Placeholder::Line => &self.line,
            Placeholder::Uid => &self.uid,
            Placeholder::Time => &self.time,
            Placeholder::Checkbox => &self.checkbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobbin_core::{EventTime, Origin};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn sample_event() -> Event {
        Event {
            start: Some(EventTime::from_utc(
                Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            )),
            duration: Some(Duration::minutes(30)),
            all_day: false,
            title: "standup".to_string(),
            description: "daily sync".to_string(),
            tag: Some("todo.work".to_string()),
            done: true,
            done_at: None,
            origin: Origin::new("notes/work.md", 12),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn renders_all_placeholders() {
        let template =
            Template::compile("[{checkbox}] {tag}: {title} / {description} @ {time} ({uid})")
                .unwrap();
        let rendered = template.render(&RenderFields::from_event(&sample_event()));
        assert_eq!(
            rendered,
            "[x] todo.work: standup / daily sync @ 2024-03-05 09:00 to 09:30 (duration: 0:30) (notes/work.md:12)"
        );
    }

    #[test]
    fn source_and_line() {
        let template = Template::compile("{source} (line {line})").unwrap();
        let rendered = template.render(&RenderFields::from_event(&sample_event()));
        assert_eq!(rendered, "notes/work.md (line 12)");
    }

    #[test]
    fn literal_only_template() {
        let template = Template::compile("no placeholders at all").unwrap();
        let fields = RenderFields::from_event(&sample_event());
        assert_eq!(template.render(&fields), "no placeholders at all");
    }

    #[test]
    fn unknown_placeholder_rejected_at_compile_time() {
        assert_eq!(
            Template::compile("hello {bogus}").unwrap_err(),
            TemplateError::UnknownPlaceholder("bogus".to_string())
        );
    }

    #[test]
    fn unterminated_placeholder_rejected() {
        assert!(matches!(
            Template::compile("hello {title").unwrap_err(),
            TemplateError::Unterminated(_)
        ));
    }

    #[test]
    fn unchecked_checkbox_is_space() {
        let mut event = sample_event();
        event.done = false;
        let template = Template::compile("[{checkbox}]").unwrap();
        assert_eq!(template.render(&RenderFields::from_event(&event)), "[ ]");
    }

    #[test]
    fn untagged_event_renders_empty_tag() {
        let mut event = sample_event();
        event.tag = None;
        let template = Template::compile("<{tag}>").unwrap();
        assert_eq!(template.render(&RenderFields::from_event(&event)), "<>");
    }
}
