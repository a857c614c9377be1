//! LZWDecode filter

use super::DecodeOnce;
use super::EncodeOnce;
use super::params::DecodeParams;
use crate::error::{Error, Result};
use crate::io::sink::{Sink, SinkHandle};
use crate::io::stream::{Stream, StreamHandle};

/// Decode LZW compressed data. `early_change` matches the stream
/// dictionary's EarlyChange entry (on by default).
pub fn decode_lzw(data: &[u8], early_change: bool) -> Result<Vec<u8>> {
    let mut decoder = weezl::decode::Decoder::with_tiff_size_switch(
        weezl::BitOrder::Msb,
        if early_change { 8 } else { 9 },
    );

    decoder
        .decode(data)
        .map_err(|e| Error::Generic(format!("LZWDecode failed: {:?}", e)))
}

/// Encode data with LZW compression
pub fn encode_lzw(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
    encoder
        .encode(data)
        .map_err(|e| Error::Generic(format!("LZWEncode failed: {:?}", e)))
}

/// Readable stream of LZW-decoded bytes over an inner stream.
pub struct LzwStream {
    buf: DecodeOnce,
    early_change: bool,
}

impl LzwStream {
    pub fn new(inner: StreamHandle, params: &DecodeParams) -> Self {
        Self {
            buf: DecodeOnce::new(inner),
            early_change: params.early_change != 0,
        }
    }
}

impl Stream for LzwStream {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let early_change = self.early_change;
        self.buf
            .read_with(|data| decode_lzw(data, early_change), dst)
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.rewind();
        Ok(())
    }
}

/// Sink that LZW-compresses everything written, emitting at close.
pub struct LzwEncodeSink {
    buf: EncodeOnce,
}

impl LzwEncodeSink {
    pub fn new(inner: SinkHandle) -> Self {
        Self {
            buf: EncodeOnce::new(inner),
        }
    }
}

impl Sink for LzwEncodeSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.write(buf)
    }

    fn close(&mut self) -> Result<()> {
        self.buf.close_with(encode_lzw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryStream;
    use crate::io::sink::MemorySink;

    #[test]
    fn test_lzw_encode_decode() {
        let original = b"ABCABCABCABCABC"; // Repetitive data compresses well
        let compressed = encode_lzw(original).unwrap();
        let decompressed = decode_lzw(&compressed, true).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_lzw_empty_data() {
        let empty: &[u8] = &[];
        let compressed = encode_lzw(empty).unwrap();
        let decompressed = decode_lzw(&compressed, true).unwrap();
        assert_eq!(decompressed, empty);
    }

    #[test]
    fn test_lzw_stream() {
        let original = b"LZW stream test LZW stream test LZW stream test";
        let compressed = encode_lzw(original).unwrap();

        let source = StreamHandle::new(MemoryStream::from_slice(&compressed));
        let mut stream = LzwStream::new(source, &DecodeParams::default());

        let mut out = vec![0u8; original.len()];
        assert_eq!(stream.read(&mut out).unwrap(), original.len());
        assert_eq!(out, original);
        assert_eq!(stream.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_lzw_encode_sink() {
        let sink = MemorySink::new();
        let mut encoder = LzwEncodeSink::new(SinkHandle::new(sink.clone()));

        encoder.write(b"round trip ").unwrap();
        encoder.write(b"through the sink").unwrap();
        encoder.close().unwrap();

        let decoded = decode_lzw(&sink.contents(), true).unwrap();
        assert_eq!(decoded, b"round trip through the sink");
    }
}
