//! Predicate-based record exclusion.
//!
//! Drops events for which any named predicate resolves true, checking the
//! first-class boolean fields first and falling back to the `extra`
//! mapping. Unknown names and unparseable values are simply false; the
//! filter has no error conditions.

use std::collections::BTreeSet;

use crate::event::Event;
use crate::metadata::MetaValue;
use crate::temporal::parse_bool_token;

/// Drops every event matching any exclusion predicate. Order-preserving.
pub fn filter_events(events: Vec<Event>, predicates: &BTreeSet<String>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| !predicates.iter().any(|name| predicate_holds(event, name)))
        .collect()
}

fn predicate_holds(event: &Event, name: &str) -> bool {
    match name {
        "done" => event.done,
        "allday" | "all_day" => event.all_day,
        _ => match event.extra.get(name) {
            Some(MetaValue::Flag(value)) => *value,
            Some(MetaValue::Text(text)) => parse_bool_token(text).unwrap_or(false),
            None => false,
        },
    }
}
