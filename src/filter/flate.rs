//! FlateDecode (zlib/deflate) filter

use super::DecodeOnce;
use super::EncodeOnce;
use crate::error::{Error, Result};
use crate::io::sink::{Sink, SinkHandle};
use crate::io::stream::{Stream, StreamHandle};
use flate2::Compression;
use flate2::read::{ZlibDecoder, ZlibEncoder};
use std::io::Read;

/// Decode zlib/deflate compressed data
pub fn decode_flate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::Generic(format!("FlateDecode failed: {}", e)))?;
    Ok(decompressed)
}

/// Encode data with zlib/deflate
pub fn encode_flate(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let compression = match level {
        0 => Compression::none(),
        1..=3 => Compression::fast(),
        4..=6 => Compression::default(),
        _ => Compression::best(),
    };

    let mut encoder = ZlibEncoder::new(data, compression);
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| Error::Generic(format!("FlateDecode encode failed: {}", e)))?;
    Ok(compressed)
}

/// Readable stream of Flate-decoded bytes over an inner stream.
pub struct FlateStream {
    buf: DecodeOnce,
}

impl FlateStream {
    pub fn new(inner: StreamHandle) -> Self {
        Self {
            buf: DecodeOnce::new(inner),
        }
    }
}

impl Stream for FlateStream {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_with(decode_flate, dst)
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.rewind();
        Ok(())
    }
}

/// Sink that Flate-compresses everything written, emitting at close.
pub struct FlateEncodeSink {
    buf: EncodeOnce,
    level: u32,
}

impl FlateEncodeSink {
    pub fn new(inner: SinkHandle, level: u32) -> Self {
        Self {
            buf: EncodeOnce::new(inner),
            level,
        }
    }
}

impl Sink for FlateEncodeSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.write(buf)
    }

    fn close(&mut self) -> Result<()> {
        let level = self.level;
        self.buf.close_with(|data| encode_flate(data, level))
    }
}
