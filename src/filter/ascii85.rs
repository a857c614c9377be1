//! ASCII85Decode filter

use super::DecodeOnce;
use super::EncodeOnce;
use crate::error::{Error, Result};
use crate::io::sink::{Sink, SinkHandle};
use crate::io::stream::{Stream, StreamHandle};

/// Decode ASCII85 encoded data
pub fn decode_ascii85(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() * 4 / 5);
    let mut group: u32 = 0;
    let mut count = 0;

    for &byte in data {
        // Skip whitespace
        if byte.is_ascii_whitespace() {
            continue;
        }

        // End of data marker
        if byte == b'~' {
            break;
        }

        // Special 'z' character represents 4 zero bytes
        if byte == b'z' {
            if count != 0 {
                return Err(Error::Generic("Invalid 'z' in ASCII85 stream".into()));
            }
            result.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }

        // Regular ASCII85 character
        if !(b'!'..=b'u').contains(&byte) {
            return Err(Error::Generic(format!(
                "Invalid ASCII85 character: {}",
                byte
            )));
        }

        group = group * 85 + (byte - b'!') as u32;
        count += 1;

        if count == 5 {
            result.push((group >> 24) as u8);
            result.push((group >> 16) as u8);
            result.push((group >> 8) as u8);
            result.push(group as u8);
            group = 0;
            count = 0;
        }
    }

    // Handle remaining bytes
    if count > 0 {
        // Pad with 'u' characters
        for _ in count..5 {
            group = group * 85 + 84;
        }

        for i in 0..(count - 1) {
            result.push((group >> (24 - i * 8)) as u8);
        }
    }

    Ok(result)
}

/// Encode data with ASCII85
pub fn encode_ascii85(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len() * 5 / 4 + 10);

    let mut i = 0;
    while i < data.len() {
        let chunk_len = (data.len() - i).min(4);
        let chunk = &data[i..i + chunk_len];

        let mut group: u32 = 0;
        for (j, &byte) in chunk.iter().enumerate() {
            group |= (byte as u32) << (24 - j * 8);
        }

        // Special case: all zeros (only for complete 4-byte chunks)
        if group == 0 && chunk_len == 4 {
            result.push(b'z');
            i += 4;
            continue;
        }

        let mut encoded = [0u8; 5];
        let mut temp = group;
        for j in (0..5).rev() {
            encoded[j] = (temp % 85) as u8 + b'!';
            temp /= 85;
        }

        // Output all 5 bytes for complete groups, or chunk_len + 1 for partial
        let output_len = if chunk_len == 4 { 5 } else { chunk_len + 1 };
        result.extend_from_slice(&encoded[..output_len]);

        i += chunk_len;
    }

    // Add end marker
    result.extend_from_slice(b"~>");

    Ok(result)
}

/// Readable stream of base-85-decoded bytes over an inner stream.
pub struct Ascii85Stream {
    buf: DecodeOnce,
}

impl Ascii85Stream {
    pub fn new(inner: StreamHandle) -> Self {
        Self {
            buf: DecodeOnce::new(inner),
        }
    }
}

impl Stream for Ascii85Stream {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_with(decode_ascii85, dst)
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.rewind();
        Ok(())
    }
}

/// Sink that base-85-encodes everything written, emitting at close.
pub struct Ascii85EncodeSink {
    buf: EncodeOnce,
}

impl Ascii85EncodeSink {
    pub fn new(inner: SinkHandle) -> Self {
        Self {
            buf: EncodeOnce::new(inner),
        }
    }
}

impl Sink for Ascii85EncodeSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.write(buf)
    }

    fn close(&mut self) -> Result<()> {
        self.buf.close_with(encode_ascii85)
    }
}
