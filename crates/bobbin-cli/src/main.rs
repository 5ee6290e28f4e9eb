//! bobbin CLI entry point.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use bobbin_cli::cli::{Cli, OutputKind};
use bobbin_cli::config::{FileConfig, Settings};
use bobbin_cli::error::CliResult;
use bobbin_cli::scan;
use bobbin_core::{PatternResolver, TracingConfig, filter_events, init_tracing};
use bobbin_output::{encode_calendar, encode_json, encode_ndjson, encode_report};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if let Err(err) = init_tracing(tracing_config) {
        eprintln!("error: {}", err);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<String> {
    let file_config = match cli.config {
        Some(ref path) => FileConfig::load_from(path)?,
        None => FileConfig::load()?,
    };
    let settings = Settings::resolve(&cli, file_config)?;

    let now = Utc::now();
    let resolver = PatternResolver::default();

    let events = scan::collect_events(&cli.input, &settings, now, &resolver)?;
    let events = filter_events(events, &settings.exclude);

    let output = match settings.output {
        OutputKind::Calendar => encode_calendar(&events, now, &settings.calendar),
        OutputKind::Report => encode_report(&events, &settings.report),
        OutputKind::Json => encode_json(&events)?,
        OutputKind::Ndjson => encode_ndjson(&events)?,
    };
    Ok(output)
}
