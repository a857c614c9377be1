// Clippy lints that are too pedantic for this codebase
#![allow(clippy::manual_range_contains)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::manual_div_ceil)]

//! pdfstream - Streaming I/O and decode filters for PDF document processing
//!
//! This library turns raw, possibly filter-encoded byte sequences stored
//! inside a PDF file into the decoded byte streams the object-model parser
//! and font/image consumers operate on.
//!
//! # Modules
//!
//! - `io` - Stream/sink contracts, concrete sources (memory, file region,
//!   concatenation) and the bounded lookahead adapter
//! - `filter` - Chainable decode/encode filters, the filter registry, and
//!   predictor reconstruction
//! - `error` - Crate-wide error type
//!
//! # Reading a filtered stream
//!
//! Consumers ask the [`filter::FilterRegistry`] for a decode filter over a
//! source; stacked encodings compose through
//! [`filter::FilterRegistry::decode_chain`]. The Flate and LZW factories
//! interpose predictor reconstruction when the stream dictionary declares a
//! predictor.

pub mod error;
pub mod filter;
pub mod io;

pub use error::{Error, Result};
pub use filter::{DecodeParams, FilterFactory, FilterRegistry, Predicted, Predictor};
pub use io::{
    ConcatStream, FileRegionStream, LookaheadReader, MemorySink, MemoryStream, SharedFile, Sink,
    SinkHandle, Stream, StreamHandle,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
