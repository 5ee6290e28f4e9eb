//! Inline tag grammar.
//!
//! Scans a line of free text for an embedded event marker of the form
//! `#name{.segments} {metadata} trailing content`, optionally preceded by a
//! `[ ]`/`[x]` checkbox. The grammar does not filter by tag name; eligibility
//! against the configured event tags is the caller's concern.

use std::collections::BTreeSet;

use regex::Regex;

/// A raw per-line match of the tag grammar.
///
/// Consumed immediately by the record assembler; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTagMatch {
    /// The matched tag, marker character included (`#todo.home`).
    pub tag: String,
    /// The metadata block interior, undecoded, if a block was present.
    pub metadata: Option<String>,
    /// Everything after the tag and metadata block, untrimmed.
    pub content: String,
    /// Checkbox state preceding the tag: `[x]` is `Some(true)`, `[ ]` is
    /// `Some(false)`, absent is `None`.
    pub checkbox: Option<bool>,
}

/// Compiled tag grammar for one marker character.
#[derive(Debug)]
pub struct TagScanner {
    pattern: Regex,
}

impl TagScanner {
    /// Compiles the grammar for the given marker character.
    pub fn new(marker: char) -> Self {
        let marker = regex::escape(&marker.to_string());
        let pattern = Regex::new(&format!(
            r"(?:\[(?P<checkbox>[xX ])\]\s*)?(?P<tag>{marker}\w+(?:\.\w+)*)(?:\s*\{{(?P<meta>[^{{}}]*)\}})?\s*(?P<content>.*)$"
        ))
        .expect("tag grammar regex is valid");
        Self { pattern }
    }

    /// Scans a line for the leftmost embedded event tag.
    ///
    /// Returns `None` when the line carries no tag; that is not an error.
    pub fn scan_line(&self, line: &str) -> Option<RawTagMatch> {
        let caps = self.pattern.captures(line)?;
        let checkbox = caps
            .name("checkbox")
            .map(|m| m.as_str().eq_ignore_ascii_case("x"));
        Some(RawTagMatch {
            tag: caps["tag"].to_string(),
            metadata: caps.name("meta").map(|m| m.as_str().to_string()),
            content: caps["content"].to_string(),
            checkbox,
        })
    }
}

/// Cheap substring pre-filter: does the line mention any configured event
/// tag at all?
///
/// An optimization for the traversal loop, not a correctness requirement;
/// lines passing this filter still go through the full grammar.
pub fn line_mentions_tag(line: &str, marker: char, names: &BTreeSet<String>) -> bool {
    names
        .iter()
        .any(|name| line.contains(&format!("{marker}{name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> TagScanner {
        TagScanner::new('#')
    }

    #[test]
    fn plain_tag_with_content() {
        let m = scanner().scan_line("#todo water the plants").unwrap();
        assert_eq!(m.tag, "#todo");
        assert_eq!(m.metadata, None);
        assert_eq!(m.content, "water the plants");
        assert_eq!(m.checkbox, None);
    }

    #[test]
    fn dotted_tag() {
        let m = scanner().scan_line("#todo.home.garden weeding").unwrap();
        assert_eq!(m.tag, "#todo.home.garden");
        assert_eq!(m.content, "weeding");
    }

    #[test]
    fn metadata_block() {
        let m = scanner()
            .scan_line("#event {.work due=tomorrow} standup | daily sync")
            .unwrap();
        assert_eq!(m.tag, "#event");
        assert_eq!(m.metadata.as_deref(), Some(".work due=tomorrow"));
        assert_eq!(m.content, "standup | daily sync");
    }

    #[test]
    fn tag_mid_line() {
        let m = scanner()
            .scan_line("notes from today: #todo {due=friday} follow up")
            .unwrap();
        assert_eq!(m.tag, "#todo");
        assert_eq!(m.metadata.as_deref(), Some("due=friday"));
        assert_eq!(m.content, "follow up");
    }

    #[test]
    fn checkbox_checked() {
        let m = scanner().scan_line("- [x] #todo buy milk").unwrap();
        assert_eq!(m.checkbox, Some(true));
        assert_eq!(m.content, "buy milk");
    }

    #[test]
    fn checkbox_uppercase() {
        let m = scanner().scan_line("- [X] #todo buy milk").unwrap();
        assert_eq!(m.checkbox, Some(true));
    }

    #[test]
    fn checkbox_unchecked() {
        let m = scanner().scan_line("- [ ] #todo buy milk").unwrap();
        assert_eq!(m.checkbox, Some(false));
    }

    #[test]
    fn checkbox_must_be_adjacent() {
        let m = scanner().scan_line("[x] notes #todo buy milk").unwrap();
        assert_eq!(m.checkbox, None);
        assert_eq!(m.tag, "#todo");
    }

    #[test]
    fn no_tag_is_no_match() {
        assert!(scanner().scan_line("just a plain line").is_none());
        assert!(scanner().scan_line("").is_none());
    }

    #[test]
    fn bare_marker_is_no_match() {
        assert!(scanner().scan_line("# heading text").is_none());
    }

    #[test]
    fn empty_content() {
        let m = scanner().scan_line("#todo").unwrap();
        assert_eq!(m.content, "");
        assert_eq!(m.metadata, None);
    }

    #[test]
    fn empty_metadata_block() {
        let m = scanner().scan_line("#todo {} things").unwrap();
        assert_eq!(m.metadata.as_deref(), Some(""));
        assert_eq!(m.content, "things");
    }

    #[test]
    fn custom_marker() {
        let m = TagScanner::new('@').scan_line("@todo call mom").unwrap();
        assert_eq!(m.tag, "@todo");
    }

    #[test]
    fn prefilter() {
        let names: BTreeSet<String> = ["todo".to_string(), "event".to_string()].into();
        assert!(line_mentions_tag("x #todo y", '#', &names));
        assert!(line_mentions_tag("#event.work z", '#', &names));
        assert!(!line_mentions_tag("no tags here", '#', &names));
        assert!(!line_mentions_tag("#journal entry", '#', &names));
    }
}
