//! Error types for the extraction pipeline.
//!
//! A line with no event marker is not an error (the scanner returns `None`);
//! these variants cover genuinely malformed input inside a matched tag.
//! They are recoverable per line: the traversal layer converts them to a
//! skip plus warning rather than aborting the batch.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors raised while decoding an event line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A bare metadata token that is neither a flag, a key/value pair, nor
    /// the continuation of an open quoted value.
    #[error("malformed metadata token {token:?} in {{{block}}}")]
    MalformedMetadata {
        /// The offending token.
        token: String,
        /// The full bracket interior it appeared in.
        block: String,
    },

    /// A token that does not parse as a tri-state boolean.
    #[error("not a boolean token: {0:?}")]
    MalformedBoolean(String),

    /// `title` and `description` metadata must be given together.
    #[error("title and description metadata must be given together")]
    InconsistentTitleFields,
}
