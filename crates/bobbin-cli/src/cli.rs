//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// bobbin - extract inline event tags from your notes
#[derive(Debug, Parser)]
#[command(name = "bobbin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Glob pattern of note files, or a previously produced record file
    /// (.json / .ndjson / .jsonl)
    pub input: String,

    /// Path to configuration file
    #[arg(long, short, env = "BOBBIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Output format flags ---
    /// Output an iCalendar document (default)
    #[arg(long, group = "output_format")]
    pub ical: bool,

    /// Output a tag-grouped Markdown report
    #[arg(long, group = "output_format")]
    pub report: bool,

    /// Output a JSON array of event records
    #[arg(long, group = "output_format")]
    pub json: bool,

    /// Output newline-delimited JSON event records
    #[arg(long, group = "output_format")]
    pub ndjson: bool,

    // --- Extraction options ---
    /// Tag name that triggers parsing (can be repeated; replaces the
    /// configured set)
    #[arg(long, action = clap::ArgAction::Append)]
    pub event_tag: Vec<String>,

    /// Title/description delimiter character
    #[arg(long)]
    pub delimiter: Option<char>,

    // --- Filter options ---
    /// Drop events whose named field is true (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Skip source files whose path matches this pattern (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub exclude_path: Vec<String>,

    /// Omit dateless events from calendar output instead of dating them
    /// today
    #[arg(long)]
    pub drop_dateless: bool,
}

/// The serializer selected by the output flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// iCalendar document.
    #[default]
    Calendar,
    /// Tag-grouped Markdown report.
    Report,
    /// JSON array of records.
    Json,
    /// Newline-delimited JSON records.
    Ndjson,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_kind(&self) -> OutputKind {
        if self.report {
            OutputKind::Report
        } else if self.json {
            OutputKind::Json
        } else if self.ndjson {
            OutputKind::Ndjson
        } else {
            OutputKind::Calendar
        }
    }
}
