//! Configuration.
//!
//! All settings live in a single `config.toml` at
//! `~/.config/bobbin/config.toml` by default. [`Settings`] is the resolved
//! form: CLI flags merged over the file, templates and path patterns
//! compiled, so bad placeholder names and patterns fail at load time.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Duration;
use regex::Regex;
use serde::{Deserialize, Serialize};

use bobbin_core::ExtractConfig;
use bobbin_output::{CalendarConfig, DEFAULT_LINE_TEMPLATE, ReportConfig, Template};

use crate::cli::{Cli, OutputKind};
use crate::error::{CliError, CliResult};

// ---------------------------------------------------------------------------
// FileConfig (config.toml)
// ---------------------------------------------------------------------------

/// On-disk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Extraction settings.
    pub extract: ExtractSection,

    /// Filter settings.
    pub filter: FilterSection,

    /// Output settings.
    pub output: OutputSection,
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    /// Leading symbol identifying an event tag token.
    pub marker: char,

    /// Tag names that trigger parsing.
    pub event_tags: Vec<String>,

    /// Title/description delimiter character.
    pub delimiter: char,

    /// Duration assigned to a due instant with no explicit span.
    pub default_duration_minutes: i64,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            marker: '#',
            event_tags: ["event", "todo", "vevent", "vtodo"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            delimiter: '|',
            default_duration_minutes: 30,
        }
    }
}

/// Filter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    /// Drop events whose named field is true.
    pub exclude: Vec<String>,

    /// Skip source files whose path matches any of these patterns.
    pub exclude_paths: Vec<String>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Template rendered into the calendar SUMMARY property.
    pub calendar_title_template: String,

    /// Template rendered into the calendar DESCRIPTION property.
    pub calendar_description_template: String,

    /// Template rendered once per report line.
    pub report_line_template: String,

    /// Whether dateless events are emitted as all-day today.
    pub dateless_events_today: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            calendar_title_template: "{title}".to_string(),
            calendar_description_template: "{description}".to_string(),
            report_line_template: DEFAULT_LINE_TEMPLATE.to_string(),
            dateless_events_today: true,
        }
    }
}

impl FileConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bobbin")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Settings (resolved)
// ---------------------------------------------------------------------------

/// Fully resolved run settings.
#[derive(Debug)]
pub struct Settings {
    /// Extraction configuration passed to the core.
    pub extract: ExtractConfig,
    /// Exclusion predicate field names.
    pub exclude: BTreeSet<String>,
    /// Compiled path exclusion patterns.
    pub exclude_paths: Vec<Regex>,
    /// Calendar encoder configuration.
    pub calendar: CalendarConfig,
    /// Report encoder configuration.
    pub report: ReportConfig,
    /// Selected serializer.
    pub output: OutputKind,
}

impl Settings {
    /// Merges CLI flags over file configuration, compiling templates and
    /// path patterns.
    pub fn resolve(cli: &Cli, file: FileConfig) -> CliResult<Self> {
        let event_tags: BTreeSet<String> = if cli.event_tag.is_empty() {
            file.extract.event_tags.into_iter().collect()
        } else {
            cli.event_tag.iter().cloned().collect()
        };

        let extract = ExtractConfig {
            marker: file.extract.marker,
            event_tags,
            delimiter: cli.delimiter.unwrap_or(file.extract.delimiter),
            default_duration: Duration::minutes(file.extract.default_duration_minutes),
        };

        let mut exclude: BTreeSet<String> = file.filter.exclude.into_iter().collect();
        exclude.extend(cli.exclude.iter().cloned());

        let exclude_paths = file
            .filter
            .exclude_paths
            .iter()
            .chain(cli.exclude_path.iter())
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    CliError::Config(format!("invalid exclude path pattern {pattern:?}: {e}"))
                })
            })
            .collect::<CliResult<Vec<_>>>()?;

        let calendar = CalendarConfig {
            title_template: Template::compile(&file.output.calendar_title_template)?,
            description_template: Template::compile(&file.output.calendar_description_template)?,
            dateless_events_today: file.output.dateless_events_today && !cli.drop_dateless,
            ..Default::default()
        };

        let report = ReportConfig {
            line_template: Template::compile(&file.output.report_line_template)?,
            ..Default::default()
        };

        Ok(Self {
            extract,
            exclude,
            exclude_paths,
            calendar,
            report,
            output: cli.output_kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["bobbin"];
        full.extend(args);
        full.push("notes/*.md");
        Cli::parse_from(full)
    }

    #[test]
    fn file_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.extract.marker, '#');
        assert_eq!(config.extract.delimiter, '|');
        assert_eq!(config.extract.default_duration_minutes, 30);
        assert!(config.extract.event_tags.contains(&"todo".to_string()));
        assert!(config.output.dateless_events_today);
    }

    #[test]
    fn parses_toml_sections() {
        let toml_content = r#"
[extract]
event_tags = ["task", "meeting"]
delimiter = ":"

[filter]
exclude = ["done", "cancelled"]
exclude_paths = ["archive/"]

[output]
dateless_events_today = false
"#;
        let config: FileConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.extract.event_tags, vec!["task", "meeting"]);
        assert_eq!(config.extract.delimiter, ':');
        assert_eq!(config.filter.exclude, vec!["done", "cancelled"]);
        assert!(!config.output.dateless_events_today);
        // unspecified fields keep their defaults
        assert_eq!(config.extract.marker, '#');
        assert_eq!(config.output.calendar_title_template, "{title}");
    }

    #[test]
    fn resolve_merges_cli_over_file() {
        let config = FileConfig::default();
        let cli = cli(&["--event-tag", "task", "--exclude", "cancelled", "--delimiter", ":"]);
        let settings = Settings::resolve(&cli, config).unwrap();

        assert_eq!(
            settings.extract.event_tags,
            BTreeSet::from(["task".to_string()])
        );
        assert_eq!(settings.extract.delimiter, ':');
        assert!(settings.exclude.contains("cancelled"));
    }

    #[test]
    fn resolve_keeps_file_tags_without_cli_override() {
        let settings = Settings::resolve(&cli(&[]), FileConfig::default()).unwrap();
        assert!(settings.extract.event_tags.contains("todo"));
        assert!(settings.extract.event_tags.contains("vevent"));
    }

    #[test]
    fn drop_dateless_flag_wins() {
        let settings = Settings::resolve(&cli(&["--drop-dateless"]), FileConfig::default()).unwrap();
        assert!(!settings.calendar.dateless_events_today);
    }

    #[test]
    fn bad_template_fails_at_load() {
        let mut config = FileConfig::default();
        config.output.report_line_template = "{bogus}".to_string();
        let err = Settings::resolve(&cli(&[]), config).unwrap_err();
        assert!(matches!(err, CliError::Template(_)));
    }

    #[test]
    fn bad_path_pattern_fails_at_load() {
        let mut config = FileConfig::default();
        config.filter.exclude_paths = vec!["[unclosed".to_string()];
        let err = Settings::resolve(&cli(&[]), config).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn load_from_missing_file_errors() {
        let err = FileConfig::load_from(Path::new("/nonexistent/bobbin.toml")).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
