//! Core stream infrastructure
//!
//! This module provides the byte-source and byte-sink contracts, the
//! concrete sources (memory, file region, concatenation), and the bounded
//! lookahead adapter that syntax parsers sit on.

pub mod concat;
pub mod file_region;
pub mod lookahead;
pub mod memory;
pub mod sink;
pub mod stream;

pub use concat::{ConcatStream, SEPARATOR};
pub use file_region::{FileRegionStream, SharedFile};
pub use lookahead::{DEFAULT_CAPACITY, LookaheadReader};
pub use memory::MemoryStream;
pub use sink::{MemorySink, Sink, SinkHandle};
pub use stream::{Stream, StreamHandle};
