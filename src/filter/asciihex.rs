//! ASCIIHexDecode filter

use super::DecodeOnce;
use super::EncodeOnce;
use crate::error::{Error, Result};
use crate::io::sink::{Sink, SinkHandle};
use crate::io::stream::{Stream, StreamHandle};

/// Decode ASCIIHex encoded data
pub fn decode_ascii_hex(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() / 2);
    let mut high_nibble: Option<u8> = None;

    for &byte in data {
        // Skip whitespace
        if byte.is_ascii_whitespace() {
            continue;
        }

        // End of data marker
        if byte == b'>' {
            break;
        }

        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'A'..=b'F' => byte - b'A' + 10,
            b'a'..=b'f' => byte - b'a' + 10,
            _ => return Err(Error::Generic(format!("Invalid hex character: {}", byte))),
        };

        match high_nibble {
            None => high_nibble = Some(nibble),
            Some(high) => {
                result.push((high << 4) | nibble);
                high_nibble = None;
            }
        }
    }

    // Handle odd number of hex digits
    if let Some(high) = high_nibble {
        result.push(high << 4);
    }

    Ok(result)
}

/// Encode data with ASCIIHex
pub fn encode_ascii_hex(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() * 2 + 1);

    for &byte in data {
        let high = (byte >> 4) & 0x0F;
        let low = byte & 0x0F;

        result.push(if high < 10 {
            b'0' + high
        } else {
            b'A' + high - 10
        });
        result.push(if low < 10 {
            b'0' + low
        } else {
            b'A' + low - 10
        });
    }

    result.push(b'>');

    Ok(result)
}

/// Readable stream of hex-decoded bytes over an inner stream.
pub struct AsciiHexStream {
    buf: DecodeOnce,
}

impl AsciiHexStream {
    pub fn new(inner: StreamHandle) -> Self {
        Self {
            buf: DecodeOnce::new(inner),
        }
    }
}

impl Stream for AsciiHexStream {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_with(decode_ascii_hex, dst)
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.rewind();
        Ok(())
    }
}

/// Sink that hex-encodes everything written, emitting at close.
pub struct AsciiHexEncodeSink {
    buf: EncodeOnce,
}

impl AsciiHexEncodeSink {
    pub fn new(inner: SinkHandle) -> Self {
        Self {
            buf: EncodeOnce::new(inner),
        }
    }
}

impl Sink for AsciiHexEncodeSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.write(buf)
    }

    fn close(&mut self) -> Result<()> {
        self.buf.close_with(encode_ascii_hex)
    }
}
