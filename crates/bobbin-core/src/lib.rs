//! Core types: tag grammar, metadata decoding, temporal normalization,
//! event assembly and filtering.

pub mod assemble;
pub mod error;
pub mod event;
pub mod filter;
pub mod metadata;
pub mod tag;
pub mod temporal;
pub mod time;
pub mod tracing;

pub use assemble::{Assembler, ExtractConfig, Extractor, NO_DESCRIPTION, NO_TITLE};
pub use error::{ExtractError, ExtractResult};
pub use event::{Event, Origin};
pub use filter::filter_events;
pub use metadata::{DecodedMetadata, MetaValue, decode_metadata};
pub use tag::{RawTagMatch, TagScanner, line_mentions_tag};
pub use temporal::{
    DateResolver, PatternResolver, Resolved, Temporal, TemporalSpec, parse_bool_token,
    resolve_date, resolve_temporal,
};
pub use time::EventTime;
pub use tracing::{TracingConfig, TracingError, init_tracing};
