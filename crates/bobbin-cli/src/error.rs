//! CLI error types.

use thiserror::Error;

use bobbin_output::{RecordError, TemplateError};

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that abort a run.
///
/// Per-line and per-file failures never reach here; they are converted to a
/// skip plus warning at the traversal boundary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An output template failed to compile.
    #[error("invalid output template: {0}")]
    Template(#[from] TemplateError),

    /// The input glob pattern is malformed.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The top-level input could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The unreadable path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A record file failed to decode.
    #[error("record decode failed: {0}")]
    Records(#[from] RecordError),

    /// The input pattern matched nothing.
    #[error("no input files matched {0:?}")]
    NoInput(String),
}
