//! PDF stream decode/encode filters
//!
//! Implements the chainable filter layer: pass-through wrappers, the
//! name-keyed registry, the concrete codec wrappers and the predictor
//! reconstruction pass that follows Flate/LZW when the stream dictionary
//! declares one.

pub mod ascii85;
pub mod asciihex;
pub mod flate;
pub mod lzw;
pub mod params;
pub mod predictor;
pub mod registry;
pub mod runlength;
pub mod wrap;

pub use ascii85::*;
pub use asciihex::*;
pub use flate::*;
pub use lzw::*;
pub use params::*;
pub use predictor::*;
pub use registry::*;
pub use runlength::*;
pub use wrap::*;

use crate::error::Result;
use crate::io::sink::SinkHandle;
use crate::io::stream::StreamHandle;

/// Map a PDF filter name, including the inline-image abbreviations, to its
/// canonical form. Unknown names pass through unchanged so caller-registered
/// filters keep working.
pub fn canonical_name(name: &str) -> &str {
    match name {
        "FlateDecode" | "Fl" => "FlateDecode",
        "LZWDecode" | "LZW" => "LZWDecode",
        "ASCII85Decode" | "A85" => "ASCII85Decode",
        "ASCIIHexDecode" | "AHx" => "ASCIIHexDecode",
        "RunLengthDecode" | "RL" => "RunLengthDecode",
        "CCITTFaxDecode" | "CCF" => "CCITTFaxDecode",
        "DCTDecode" | "DCT" => "DCTDecode",
        other => other,
    }
}

/// Decodes the whole inner stream on first read, then serves the result.
///
/// The PDF filters here are one-shot transforms over the stored bytes;
/// decoding eagerly keeps each codec file down to its slice functions while
/// still presenting the filter as a forward-readable stream with rewind.
pub(crate) struct DecodeOnce {
    inner: wrap::InFilter,
    decoded: Option<Vec<u8>>,
    pos: usize,
}

impl DecodeOnce {
    pub(crate) fn new(inner: StreamHandle) -> Self {
        Self {
            inner: wrap::InFilter::new(inner),
            decoded: None,
            pos: 0,
        }
    }

    pub(crate) fn read_with<F>(&mut self, decode: F, dst: &mut [u8]) -> Result<usize>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>>,
    {
        if self.decoded.is_none() {
            let raw = self.inner.read_to_end(0)?;
            self.decoded = Some(decode(&raw)?);
            self.inner.close();
        }
        match &self.decoded {
            Some(decoded) => {
                let n = dst.len().min(decoded.len() - self.pos);
                dst[..n].copy_from_slice(&decoded[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
            None => Ok(0),
        }
    }

    /// Rewind to the start of the decoded bytes.
    pub(crate) fn rewind(&mut self) {
        self.pos = 0;
    }
}

/// Buffers writes and encodes the whole payload once, at close.
pub(crate) struct EncodeOnce {
    inner: wrap::OutFilter,
    pending: Vec<u8>,
    finished: bool,
}

impl EncodeOnce {
    pub(crate) fn new(inner: SinkHandle) -> Self {
        Self {
            inner: wrap::OutFilter::new(inner),
            pending: Vec::new(),
            finished: false,
        }
    }

    pub(crate) fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.finished {
            self.pending.extend_from_slice(buf);
        }
        Ok(())
    }

    pub(crate) fn close_with<F>(&mut self, encode: F) -> Result<()>
    where
        F: FnOnce(&[u8]) -> Result<Vec<u8>>,
    {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let encoded = encode(&self.pending)?;
        self.pending = Vec::new();
        self.inner.write(&encoded)?;
        self.inner.flush()?;
        self.inner.close()
    }
}
