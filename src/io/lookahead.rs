//! Bounded lookahead over any stream
//!
//! [`LookaheadReader`] wraps a [`StreamHandle`] with a fixed-capacity window
//! supporting `peek` and `unread` without copying the whole source. Data is
//! deliberately loaded into the second half of the window so that up to half
//! the capacity remains available as rewindable history at all times; callers
//! must keep `peek`/`unread` within that half-window bound.

use crate::error::{Error, Result};
use crate::io::stream::{Stream, StreamHandle};

/// Default window capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// A lookahead window over a stream: bounded `peek`, `unread`, and a read
/// counter that tracks the consumer's logical position.
pub struct LookaheadReader {
    source: StreamHandle,
    buf: Vec<u8>,
    capacity: usize,
    /// cursor into `buf`
    pos: usize,
    /// fill level: bytes at `buf[..end]` are loaded
    end: usize,
    /// in-buffer offset past which no data exists, once the source is done
    eod: Option<usize>,
    consumed: u64,
}

impl LookaheadReader {
    /// Wrap `source` with the default window capacity.
    pub fn new(source: StreamHandle) -> Result<Self> {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    /// Wrap `source` with an explicit capacity (even, at least 2).
    pub fn with_capacity(source: StreamHandle, capacity: usize) -> Result<Self> {
        if capacity < 2 || capacity % 2 != 0 {
            return Err(Error::argument(format!(
                "lookahead capacity must be even and at least 2, got {}",
                capacity
            )));
        }
        let mut reader = Self {
            source,
            buf: vec![0; capacity],
            capacity,
            pos: capacity / 2,
            end: capacity / 2,
            eod: None,
            consumed: 0,
        };
        // pre-fill the second half so history space exists from the start
        reader.fill_tail(capacity - 1)?;
        Ok(reader)
    }

    fn midpoint(&self) -> usize {
        self.capacity / 2
    }

    /// Bytes consumed so far, net of `unread`.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// True once the cursor has passed the end of the source's data.
    pub fn is_eof(&self) -> bool {
        matches!(self.eod, Some(e) if self.pos >= e)
    }

    /// Byte at `cursor + offset` without moving the cursor.
    ///
    /// `Ok(None)` at or past end of data; `Error::Bounds` when the index
    /// falls outside the physical window.
    pub fn peek(&mut self, offset: isize) -> Result<Option<u8>> {
        let idx = self.pos as isize + offset;
        if idx < 0 || idx >= self.capacity as isize {
            return Err(Error::bounds(format!(
                "peek offset {} outside window of {} bytes",
                offset, self.capacity
            )));
        }
        let idx = idx as usize;
        if idx >= self.end {
            self.fill_tail(idx)?;
        }
        match self.eod {
            Some(e) if idx >= e => Ok(None),
            _ => Ok(Some(self.buf[idx])),
        }
    }

    /// Move the cursor back `n` bytes, making them readable again.
    pub fn unread(&mut self, n: usize) -> Result<()> {
        if n > self.pos {
            return Err(Error::bounds(format!(
                "cannot unread {} bytes, only {} of history available",
                n, self.pos
            )));
        }
        self.pos -= n;
        self.consumed = self.consumed.saturating_sub(n as u64);
        Ok(())
    }

    /// Read up to `buf.len()` bytes, refilling the window as the cursor
    /// crosses the high-water mark.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let n = dst.len();
        if n == 0 {
            return Ok(0);
        }

        let buffered = self.end - self.pos;
        if n <= buffered {
            dst.copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            self.consumed += n as u64;
            if self.pos >= self.capacity * 3 / 4 {
                self.feed()?;
            }
            return Ok(n);
        }

        // request exceeds the window: drain what is buffered, then read the
        // remainder straight from the source
        dst[..buffered].copy_from_slice(&self.buf[self.pos..self.end]);
        let old_pos = self.pos;
        self.pos = self.end;
        let mut total = buffered;
        let mut exhausted = self.eod.is_some();
        while total < n && !exhausted {
            let got = self.source.read(&mut dst[total..])?;
            if got == 0 {
                exhausted = true;
            } else {
                total += got;
            }
        }
        self.consumed += total as u64;
        if total > 0 {
            self.resync(&dst[..total], old_pos, exhausted);
            self.feed()?;
        } else if exhausted && self.eod.is_none() {
            self.eod = Some(self.end);
        }
        Ok(total)
    }

    /// Read a single byte, `None` at end of data.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Rebuild the window after a bypassing read so that history directly
    /// below the midpoint reflects the bytes just handed to the caller.
    ///
    /// `old_pos` is the cursor position before the read; bytes below it are
    /// the only pre-read history still eligible to keep.
    fn resync(&mut self, returned: &[u8], old_pos: usize, exhausted: bool) {
        let mid = self.midpoint();
        let from_new = returned.len().min(mid);
        let from_old = (mid - from_new).min(old_pos);

        if from_old > 0 {
            self.buf
                .copy_within(old_pos - from_old..old_pos, mid - from_new - from_old);
        }
        self.buf[mid - from_new..mid]
            .copy_from_slice(&returned[returned.len() - from_new..]);

        self.pos = mid;
        self.end = mid;
        self.eod = exhausted.then_some(mid);
    }

    /// Refill policy: once the cursor is past the midpoint, shift the window
    /// left so exactly half the capacity of history remains, then top up the
    /// freed tail from the source.
    fn feed(&mut self) -> Result<()> {
        let mid = self.midpoint();
        if self.pos > mid {
            let shift = self.pos - mid;
            self.buf.copy_within(shift..self.end, 0);
            self.pos -= shift;
            self.end -= shift;
            if let Some(e) = self.eod {
                self.eod = Some(e - shift);
            }
        }
        self.fill_tail(self.capacity - 1)
    }

    /// Load source bytes into the unfilled tail until `idx` is covered, the
    /// window is full, or the source is exhausted.
    fn fill_tail(&mut self, idx: usize) -> Result<()> {
        while self.end <= idx && self.end < self.capacity && self.eod.is_none() {
            let got = self.source.read(&mut self.buf[self.end..self.capacity])?;
            if got == 0 {
                self.eod = Some(self.end);
            } else {
                self.end += got;
            }
        }
        Ok(())
    }
}

impl Stream for LookaheadReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        LookaheadReader::read(self, buf)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        LookaheadReader::read_byte(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryStream;

    fn reader(data: &[u8], capacity: usize) -> LookaheadReader {
        let source = StreamHandle::new(MemoryStream::from_slice(data));
        LookaheadReader::with_capacity(source, capacity).unwrap()
    }

    fn sequence(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_capacity_validation() {
        let source = StreamHandle::new(MemoryStream::from_slice(b""));
        assert!(LookaheadReader::with_capacity(source.clone(), 0).is_err());
        assert!(LookaheadReader::with_capacity(source.clone(), 7).is_err());
        assert!(LookaheadReader::with_capacity(source, 8).is_ok());
    }

    #[test]
    fn test_read_sequential() {
        let data = sequence(100);
        let mut r = reader(&data, 16);
        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = r.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, data);
    }

    #[test]
    fn test_unread_then_reread_reproduces_bytes() {
        let data = sequence(64);
        let mut r = reader(&data, 16);

        let mut first = [0u8; 6];
        r.read(&mut first).unwrap();
        r.unread(4).unwrap();

        let mut again = [0u8; 4];
        r.read(&mut again).unwrap();
        assert_eq!(&again, &first[2..6]);
    }

    #[test]
    fn test_unread_decrements_counter() {
        let data = sequence(64);
        let mut r = reader(&data, 16);

        let mut buf = [0u8; 5];
        r.read(&mut buf).unwrap();
        assert_eq!(r.consumed(), 5);
        r.unread(3).unwrap();
        assert_eq!(r.consumed(), 2);
    }

    #[test]
    fn test_unread_before_start_fails() {
        let data = sequence(64);
        let mut r = reader(&data, 16);
        // cursor starts at the midpoint; history below it is the whole
        // first half of the window
        assert!(matches!(r.unread(9), Err(Error::Bounds(_))));
        assert!(r.unread(8).is_ok());
    }

    #[test]
    fn test_peek_does_not_move_cursor() {
        let data = sequence(64);
        let mut r = reader(&data, 16);

        let peeked = r.peek(0).unwrap();
        assert_eq!(peeked, Some(data[0]));
        assert_eq!(r.peek(0).unwrap(), Some(data[0]));
        assert_eq!(r.read_byte().unwrap(), peeked);
        assert_eq!(r.consumed(), 1);
    }

    #[test]
    fn test_peek_ahead() {
        let data = sequence(64);
        let mut r = reader(&data, 16);
        assert_eq!(r.peek(3).unwrap(), Some(data[3]));
    }

    #[test]
    fn test_peek_back_into_history() {
        let data = sequence(64);
        let mut r = reader(&data, 16);
        let mut buf = [0u8; 2];
        r.read(&mut buf).unwrap();
        assert_eq!(r.peek(-2).unwrap(), Some(data[0]));
    }

    #[test]
    fn test_peek_outside_window_fails() {
        let data = sequence(64);
        let mut r = reader(&data, 16);
        assert!(matches!(r.peek(16), Err(Error::Bounds(_))));
        assert!(matches!(r.peek(-9), Err(Error::Bounds(_))));
    }

    #[test]
    fn test_peek_at_eod_returns_none() {
        let mut r = reader(b"AB", 16);
        assert_eq!(r.peek(2).unwrap(), None);
        assert_eq!(r.peek(1).unwrap(), Some(b'B'));
    }

    #[test]
    fn test_is_eof() {
        let mut r = reader(b"AB", 16);
        assert!(!r.is_eof());
        r.read_byte().unwrap();
        r.read_byte().unwrap();
        assert!(r.is_eof());
        assert_eq!(r.read_byte().unwrap(), None);
    }

    #[test]
    fn test_refill_preserves_history_half() {
        let data = sequence(200);
        let mut r = reader(&data, 16);

        // march well past several refills
        let mut buf = [0u8; 4];
        for _ in 0..8 {
            r.read(&mut buf).unwrap();
        }
        assert_eq!(r.consumed(), 32);

        // rewind within the guaranteed half-window and re-read
        r.unread(8).unwrap();
        let mut again = [0u8; 8];
        r.read(&mut again).unwrap();
        assert_eq!(&again[..], &data[24..32]);
    }

    #[test]
    fn test_large_read_bypasses_window() {
        let data = sequence(300);
        let mut r = reader(&data, 16);

        let mut big = vec![0u8; 100];
        assert_eq!(r.read(&mut big).unwrap(), 100);
        assert_eq!(&big[..], &data[..100]);
        assert_eq!(r.consumed(), 100);
    }

    #[test]
    fn test_large_read_keeps_history_coherent() {
        let data = sequence(300);
        let mut r = reader(&data, 16);

        let mut big = vec![0u8; 100];
        r.read(&mut big).unwrap();

        // history below the cursor reflects the tail of the large read
        r.unread(5).unwrap();
        let mut again = [0u8; 5];
        r.read(&mut again).unwrap();
        assert_eq!(&again[..], &data[95..100]);

        // and reading continues where the large read left off
        let mut next = [0u8; 5];
        r.read(&mut next).unwrap();
        assert_eq!(&next[..], &data[100..105]);
    }

    #[test]
    fn test_large_read_past_end() {
        let data = sequence(50);
        let mut r = reader(&data, 16);

        let mut big = vec![0u8; 100];
        assert_eq!(r.read(&mut big).unwrap(), 50);
        assert_eq!(&big[..50], &data[..]);
        assert!(r.is_eof());
        assert_eq!(r.read(&mut big).unwrap(), 0);
    }

    #[test]
    fn test_empty_source() {
        let mut r = reader(b"", 16);
        assert!(r.is_eof());
        assert_eq!(r.peek(0).unwrap(), None);
        assert_eq!(r.read_byte().unwrap(), None);
        assert_eq!(r.consumed(), 0);
    }

    #[test]
    fn test_read_unread_cycles_stay_consistent() {
        let data = sequence(120);
        let mut r = reader(&data, 32);
        let mut logical = 0usize;

        let mut buf = [0u8; 7];
        for _ in 0..10 {
            let n = r.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], &data[logical..logical + n]);
            logical += n;

            r.unread(3).unwrap();
            logical -= 3;

            let mut back = [0u8; 3];
            let n = r.read(&mut back).unwrap();
            assert_eq!(&back[..n], &data[logical..logical + n]);
            logical += n;
        }
        assert_eq!(r.consumed(), logical as u64);
    }
}
