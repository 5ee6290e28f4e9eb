//! Input traversal.
//!
//! Expands the input glob, reads each candidate file as UTF-8, and feeds it
//! to the extractor. An unreadable or badly encoded file is skipped with a
//! warning; only an absent top-level input is fatal. Record files
//! (`.json` / `.ndjson` / `.jsonl`) bypass extraction and feed the decoder
//! instead.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use bobbin_core::{DateResolver, Event, Extractor};
use bobbin_output::{decode_json, decode_ndjson};

use crate::config::Settings;
use crate::error::{CliError, CliResult};

/// Collects events from the input: glob traversal for note files, record
/// decoding for previously serialized output.
pub fn collect_events(
    input: &str,
    settings: &Settings,
    now: DateTime<Utc>,
    resolver: &dyn DateResolver,
) -> CliResult<Vec<Event>> {
    if let Some(kind) = record_input_kind(input) {
        return load_records(input, kind);
    }

    let extractor = Extractor::new(settings.extract.clone(), resolver);
    let mut events = Vec::new();
    let mut matched = 0usize;

    for entry in glob::glob(input)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(%err, "skipping unreadable glob entry");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        matched += 1;

        let path_str = path.display().to_string();
        if settings.exclude_paths.iter().any(|re| re.is_match(&path_str)) {
            debug!(path = %path_str, "excluded by path pattern");
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(text) => events.extend(extractor.extract_text(&path_str, &text, now)),
            Err(err) => warn!(path = %path_str, %err, "skipping unreadable source file"),
        }
    }

    if matched == 0 {
        return Err(CliError::NoInput(input.to_string()));
    }
    Ok(events)
}

/// Record file encodings, selected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordInputKind {
    Json,
    Ndjson,
}

fn record_input_kind(input: &str) -> Option<RecordInputKind> {
    let lower = input.to_ascii_lowercase();
    if lower.ends_with(".json") {
        Some(RecordInputKind::Json)
    } else if lower.ends_with(".ndjson") || lower.ends_with(".jsonl") {
        Some(RecordInputKind::Ndjson)
    } else {
        None
    }
}

fn load_records(path: &str, kind: RecordInputKind) -> CliResult<Vec<Event>> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })?;
    let events = match kind {
        RecordInputKind::Json => decode_json(&text)?,
        RecordInputKind::Ndjson => decode_ndjson(&text)?,
    };
    Ok(events)
}
