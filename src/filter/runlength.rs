//! RunLengthDecode filter

use super::DecodeOnce;
use super::EncodeOnce;
use crate::error::{Error, Result};
use crate::io::sink::{Sink, SinkHandle};
use crate::io::stream::{Stream, StreamHandle};

/// Decode RunLength encoded data
pub fn decode_run_length(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length_byte = data[i];
        i += 1;

        if length_byte == 128 {
            // End of data
            break;
        } else if length_byte < 128 {
            // Copy next (length_byte + 1) bytes literally
            let count = length_byte as usize + 1;
            if i + count > data.len() {
                return Err(Error::Generic(
                    "RunLengthDecode: unexpected end of data".into(),
                ));
            }
            result.extend_from_slice(&data[i..i + count]);
            i += count;
        } else {
            // Repeat next byte (257 - length_byte) times
            let count = 257 - length_byte as usize;
            if i >= data.len() {
                return Err(Error::Generic(
                    "RunLengthDecode: unexpected end of data".into(),
                ));
            }
            let byte = data[i];
            i += 1;
            result.resize(result.len() + count, byte);
        }
    }

    Ok(result)
}

/// Encode data with RunLength
pub fn encode_run_length(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        // Look for a run of identical bytes
        let start = i;
        let byte = data[i];
        while i < data.len() && data[i] == byte && i - start < 128 {
            i += 1;
        }
        let run_length = i - start;

        if run_length >= 2 {
            // Encode as a run
            result.push((257 - run_length) as u8);
            result.push(byte);
        } else {
            // Look for literal bytes
            i = start;
            let literal_start = i;

            while i < data.len() {
                // Check for a run of 3+ identical bytes
                if i + 2 < data.len() && data[i] == data[i + 1] && data[i] == data[i + 2] {
                    break;
                }
                i += 1;
                if i - literal_start >= 128 {
                    break;
                }
            }

            let literal_length = i - literal_start;
            if literal_length > 0 {
                result.push((literal_length - 1) as u8);
                result.extend_from_slice(&data[literal_start..i]);
            }
        }
    }

    // End of data marker
    result.push(128);

    Ok(result)
}

/// Readable stream of RunLength-decoded bytes over an inner stream.
pub struct RunLengthStream {
    buf: DecodeOnce,
}

impl RunLengthStream {
    pub fn new(inner: StreamHandle) -> Self {
        Self {
            buf: DecodeOnce::new(inner),
        }
    }
}

impl Stream for RunLengthStream {
    fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        self.buf.read_with(decode_run_length, dst)
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.rewind();
        Ok(())
    }
}

/// Sink that RunLength-encodes everything written, emitting at close.
pub struct RunLengthEncodeSink {
    buf: EncodeOnce,
}

impl RunLengthEncodeSink {
    pub fn new(inner: SinkHandle) -> Self {
        Self {
            buf: EncodeOnce::new(inner),
        }
    }
}

impl Sink for RunLengthEncodeSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.write(buf)
    }

    fn close(&mut self) -> Result<()> {
        self.buf.close_with(encode_run_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryStream;
    use crate::io::sink::MemorySink;

    #[test]
    fn test_runlength_encode_decode() {
        let original = b"AAAAAABBBCCCCCCCCCCDDDDDD";
        let encoded = encode_run_length(original).unwrap();
        let decoded = decode_run_length(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_runlength_no_runs() {
        let original = b"ABCDEFGH";
        let encoded = encode_run_length(original).unwrap();
        let decoded = decode_run_length(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_runlength_all_same() {
        let original = &[b'X'; 50];
        let encoded = encode_run_length(original).unwrap();
        let decoded = decode_run_length(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_runlength_truncated_literal() {
        // literal header promising 4 bytes with only 2 present
        let result = decode_run_length(&[3, b'A', b'B']);
        assert!(result.is_err());
    }

    #[test]
    fn test_runlength_stream() {
        let original = b"RRRRRRunLength stream";
        let encoded = encode_run_length(original).unwrap();

        let source = StreamHandle::new(MemoryStream::from_slice(&encoded));
        let mut stream = RunLengthStream::new(source);

        let mut out = vec![0u8; original.len()];
        assert_eq!(stream.read(&mut out).unwrap(), original.len());
        assert_eq!(out, original);
    }

    #[test]
    fn test_runlength_encode_sink() {
        let sink = MemorySink::new();
        let mut encoder = RunLengthEncodeSink::new(SinkHandle::new(sink.clone()));

        encoder.write(b"AAAA").unwrap();
        encoder.write(b"BBBB").unwrap();
        encoder.close().unwrap();

        let decoded = decode_run_length(&sink.contents()).unwrap();
        assert_eq!(decoded, b"AAAABBBB");
    }
}
