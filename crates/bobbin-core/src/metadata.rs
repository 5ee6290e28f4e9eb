//! Metadata block decoding.
//!
//! A tag's bracketed metadata block is a whitespace-separated sequence of
//! tokens: `.flag` classes and `key=value` pairs, where a value may be
//! double-quoted to span whitespace (`key="two words"`). Decoding splits the
//! block, re-joins quoted continuations, and produces a [`DecodedMetadata`]
//! with a shared key/flag namespace.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// A metadata value carried through to an event's `extra` mapping.
///
/// Flags decode as booleans, key/value pairs as text. The untagged serde
/// representation keeps serialized records flat (`true` vs `"value"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// A bare `.flag` class.
    Flag(bool),
    /// A `key=value` string.
    Text(String),
}

impl MetaValue {
    /// Returns the text content if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

/// Decoded metadata: key/value pairs plus flag classes.
///
/// The first occurrence of a key wins. A name present as both a key and a
/// flag keeps the key/value form; the flag entry is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMetadata {
    /// Key/value pairs, values unquoted by one layer.
    pub values: BTreeMap<String, String>,
    /// Flag classes, leading `.` stripped.
    pub flags: BTreeSet<String>,
}

impl DecodedMetadata {
    /// Looks up a key/value entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns true if the flag class is present.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Returns true if no keys and no flags were decoded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.flags.is_empty()
    }

    /// Returns every entry whose name is not in `consumed`, for carrying
    /// into an event's `extra` mapping.
    pub fn remaining(&self, consumed: &[&str]) -> BTreeMap<String, MetaValue> {
        let mut extra = BTreeMap::new();
        for (key, value) in &self.values {
            if !consumed.contains(&key.as_str()) {
                extra.insert(key.clone(), MetaValue::Text(value.clone()));
            }
        }
        for flag in &self.flags {
            if !consumed.contains(&flag.as_str()) {
                extra.insert(flag.clone(), MetaValue::Flag(true));
            }
        }
        extra
    }
}

/// Decodes a metadata block interior (the text between `{` and `}`).
///
/// Tokens are split on whitespace. A token that is neither a flag nor a
/// key/value pair is accepted only as a continuation of a preceding token
/// holding an odd number of `"` characters (an open quoted value); anything
/// else is [`ExtractError::MalformedMetadata`].
pub fn decode_metadata(block: &str) -> ExtractResult<DecodedMetadata> {
    let mut tokens: Vec<String> = Vec::new();
    for item in block.split_whitespace() {
        if item.starts_with('.') || item.contains('=') {
            tokens.push(item.to_string());
            continue;
        }
        match tokens.last_mut() {
            Some(prev) if prev.matches('"').count() % 2 == 1 => {
                prev.push(' ');
                prev.push_str(item);
            }
            _ => {
                return Err(ExtractError::MalformedMetadata {
                    token: item.to_string(),
                    block: block.to_string(),
                });
            }
        }
    }

    let mut decoded = DecodedMetadata::default();
    for token in tokens {
        if let Some(flag) = token.strip_prefix('.') {
            decoded.flags.insert(flag.to_string());
        } else if let Some((key, value)) = token.split_once('=') {
            decoded
                .values
                .entry(key.to_string())
                .or_insert_with(|| unquote(value));
        }
    }

    // key/value wins over a same-named flag
    decoded.flags.retain(|flag| !decoded.values.contains_key(flag));

    Ok(decoded)
}

/// Strips one layer of double quotes, if present on both ends.
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_and_pairs() {
        let meta = decode_metadata(".home .urgent due=tomorrow priority=2").unwrap();
        assert!(meta.has_flag("home"));
        assert!(meta.has_flag("urgent"));
        assert_eq!(meta.get("due"), Some("tomorrow"));
        assert_eq!(meta.get("priority"), Some("2"));
    }

    #[test]
    fn empty_block() {
        let meta = decode_metadata("").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn quoted_value_spans_whitespace() {
        let meta = decode_metadata(r#"title="weekly team sync" .work"#).unwrap();
        assert_eq!(meta.get("title"), Some("weekly team sync"));
        assert!(meta.has_flag("work"));
    }

    #[test]
    fn quoted_value_spans_several_tokens() {
        let meta = decode_metadata(r#"note="one two three""#).unwrap();
        assert_eq!(meta.get("note"), Some("one two three"));
    }

    #[test]
    fn bare_token_without_open_quote_errors() {
        let err = decode_metadata("due=tomorrow stray").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedMetadata { ref token, .. } if token == "stray"
        ));
    }

    #[test]
    fn leading_bare_token_errors() {
        assert!(decode_metadata("stray .flag").is_err());
    }

    #[test]
    fn first_key_occurrence_wins() {
        let meta = decode_metadata("due=monday due=friday").unwrap();
        assert_eq!(meta.get("due"), Some("monday"));
    }

    #[test]
    fn key_wins_over_same_named_flag() {
        let meta = decode_metadata(".done done=false").unwrap();
        assert_eq!(meta.get("done"), Some("false"));
        assert!(!meta.has_flag("done"));
    }

    #[test]
    fn unquotes_one_layer_only() {
        let meta = decode_metadata(r#"a="x" b=""y"""#).unwrap();
        assert_eq!(meta.get("a"), Some("x"));
        assert_eq!(meta.get("b"), Some("\"y\""));
    }

    #[test]
    fn empty_value_is_valid() {
        let meta = decode_metadata("note=").unwrap();
        assert_eq!(meta.get("note"), Some(""));
    }

    #[test]
    fn remaining_skips_consumed_names() {
        let meta = decode_metadata(".home due=tomorrow priority=2").unwrap();
        let extra = meta.remaining(&["due"]);
        assert_eq!(extra.get("home"), Some(&MetaValue::Flag(true)));
        assert_eq!(
            extra.get("priority"),
            Some(&MetaValue::Text("2".to_string()))
        );
        assert!(!extra.contains_key("due"));
    }

    #[test]
    fn decode_is_idempotent_for_balanced_blocks() {
        let meta = decode_metadata(r#".a k1=v1 k2="two words""#).unwrap();
        // re-encode (token order immaterial) and decode again
        let mut tokens: Vec<String> = meta
            .values
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        tokens.extend(meta.flags.iter().map(|f| format!(".{f}")));
        let reencoded = tokens.join(" ");
        let redecoded = decode_metadata(&reencoded).unwrap();
        assert_eq!(meta, redecoded);
    }

    #[test]
    fn meta_value_serde_is_flat() {
        let flag = serde_json::to_string(&MetaValue::Flag(true)).unwrap();
        assert_eq!(flag, "true");
        let text = serde_json::to_string(&MetaValue::Text("x".to_string())).unwrap();
        assert_eq!(text, "\"x\"");

        let parsed: MetaValue = serde_json::from_str("true").unwrap();
        assert_eq!(parsed, MetaValue::Flag(true));
        let parsed: MetaValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(parsed, MetaValue::Text("x".to_string()));
    }
}
