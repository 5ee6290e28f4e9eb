//! Serializers for extracted events: iCalendar, tag-grouped report, and
//! flat JSON/NDJSON records with a reversible load.

pub mod ical;
pub mod records;
pub mod report;
pub mod template;
pub mod timefmt;

pub use ical::{CalendarConfig, encode_calendar, escape_text};
pub use records::{
    EventRecord, RecordError, decode_json, decode_ndjson, encode_json, encode_ndjson,
};
pub use report::{DEFAULT_LINE_TEMPLATE, ReportConfig, encode_report};
pub use template::{Placeholder, RenderFields, Template, TemplateError};
pub use timefmt::{format_duration_hm, format_time_range};
