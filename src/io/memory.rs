//! In-memory byte source backed by `bytes::Bytes`

use crate::error::{Error, Result};
use crate::io::stream::Stream;
use bytes::Bytes;

/// A stream over an in-memory buffer with an explicit logical length.
///
/// The logical length may be shorter than the physical buffer; reads never
/// go past it. Zero-copy over `Bytes`, so cloning the backing data between
/// consumers is cheap.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Bytes,
    len: usize,
    pos: usize,
}

impl MemoryStream {
    /// Stream over the whole buffer (zero-copy).
    pub fn new(data: Bytes) -> Self {
        let len = data.len();
        Self { data, len, pos: 0 }
    }

    /// Stream over a byte slice (copies data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Stream over the first `len` bytes of the buffer.
    pub fn with_len(data: Bytes, len: usize) -> Result<Self> {
        if len > data.len() {
            return Err(Error::argument(format!(
                "logical length {} exceeds buffer length {}",
                len,
                data.len()
            )));
        }
        Ok(Self { data, len, pos: 0 })
    }

    /// The logical length of the stream.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Stream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.len - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.pos >= self.len {
            return Ok(None);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    fn skip(&mut self, n: usize) -> Result<usize> {
        let n = n.min(self.len - self.pos);
        self.pos += n;
        Ok(n)
    }

    fn reset(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }
}
