//! Concatenation byte source
//!
//! Presents an ordered list of streams as one continuous stream, inserting a
//! single carriage-return byte at each join. PDF content streams split
//! across several stream objects are consumed this way: the separator keeps
//! tokens on either side of a join from fusing.

use crate::error::Result;
use crate::io::stream::{Stream, StreamHandle};
use smallvec::SmallVec;

/// The byte inserted at each join between constituents.
pub const SEPARATOR: u8 = b'\r';

/// An ordered list of streams read as one, with a separator at each join.
///
/// Constituent handles are shared on construction and released when the
/// concatenation is dropped or closed. No separator follows the last
/// constituent.
pub struct ConcatStream {
    parts: SmallVec<[StreamHandle; 4]>,
    index: usize,
    separator_pending: bool,
}

impl ConcatStream {
    /// Build a concatenation over the given streams, in order.
    pub fn new<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = StreamHandle>,
    {
        Self {
            parts: parts.into_iter().collect(),
            index: 0,
            separator_pending: false,
        }
    }

    /// Number of constituent streams.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

impl Stream for ConcatStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            if self.separator_pending {
                buf[total] = SEPARATOR;
                total += 1;
                self.separator_pending = false;
                continue;
            }
            if self.index >= self.parts.len() {
                break;
            }
            let got = self.parts[self.index].read(&mut buf[total..])?;
            if got == 0 {
                self.index += 1;
                if self.index < self.parts.len() {
                    self.separator_pending = true;
                }
                continue;
            }
            total += got;
        }
        Ok(total)
    }

    fn skip(&mut self, n: usize) -> Result<usize> {
        let mut total = 0;
        while total < n {
            if self.separator_pending {
                self.separator_pending = false;
                total += 1;
                continue;
            }
            if self.index >= self.parts.len() {
                break;
            }
            let got = self.parts[self.index].skip(n - total)?;
            if got == 0 {
                self.index += 1;
                if self.index < self.parts.len() {
                    self.separator_pending = true;
                }
                continue;
            }
            total += got;
        }
        Ok(total)
    }

    fn reset(&mut self) -> Result<()> {
        // every constituent up to and including the current one
        let upto = (self.index + 1).min(self.parts.len());
        for part in self.parts.iter().take(upto) {
            part.reset()?;
        }
        self.index = 0;
        self.separator_pending = false;
        Ok(())
    }
}
