//! Stream contract and shared stream handles
//!
//! Every byte source implements the [`Stream`] trait; consumers hold
//! [`StreamHandle`]s, which are reference-counted and close idempotently.
//! The backing resource is torn down when the last handle releases it.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, Mutex};

const SKIP_CHUNK: usize = 4096;

/// The minimal capability set of a readable byte source.
///
/// `read` past end-of-medium is not an error; it returns fewer bytes than
/// requested (0 at immediate EOF). A source that cannot rewind fails only
/// when `reset` is actually invoked.
pub trait Stream: Send {
    /// Read up to `buf.len()` bytes. Returns the number of bytes read,
    /// 0 at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Read a single byte, `None` at end of stream.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Skip up to `n` bytes. Returns the number of bytes actually skipped.
    fn skip(&mut self, n: usize) -> Result<usize> {
        let mut scratch = [0u8; SKIP_CHUNK];
        let mut skipped = 0;
        while skipped < n {
            let want = (n - skipped).min(SKIP_CHUNK);
            let got = self.read(&mut scratch[..want])?;
            if got == 0 {
                break;
            }
            skipped += got;
        }
        Ok(skipped)
    }

    /// Rewind to the logical start of the stream.
    fn reset(&mut self) -> Result<()> {
        Err(Error::unsupported("stream does not support reset"))
    }
}

/// A shared, reference-counted handle to a [`Stream`].
///
/// Cloning a handle increments the share count. `close` releases only this
/// handle's share and is safe to call any number of times; the underlying
/// resource is dropped when the last share goes away. A closed handle reads
/// as an empty stream rather than erroring.
pub struct StreamHandle {
    inner: Option<Arc<Mutex<Box<dyn Stream>>>>,
}

impl StreamHandle {
    /// Wrap a stream in a new shared handle.
    pub fn new<S: Stream + 'static>(stream: S) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(stream)))),
        }
    }

    /// Read up to `buf.len()` bytes. A closed handle reads 0 bytes.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        match &self.inner {
            Some(inner) => lock(inner)?.read(buf),
            None => Ok(0),
        }
    }

    /// Read a single byte, `None` at end of stream or on a closed handle.
    pub fn read_byte(&self) -> Result<Option<u8>> {
        match &self.inner {
            Some(inner) => lock(inner)?.read_byte(),
            None => Ok(None),
        }
    }

    /// Skip up to `n` bytes, returning the count actually skipped.
    pub fn skip(&self, n: usize) -> Result<usize> {
        match &self.inner {
            Some(inner) => lock(inner)?.skip(n),
            None => Ok(0),
        }
    }

    /// Rewind to the logical start, where the source supports it.
    pub fn reset(&self) -> Result<()> {
        match &self.inner {
            Some(inner) => lock(inner)?.reset(),
            None => Ok(()),
        }
    }

    /// Read until `buf` is full or the stream ends. Returns bytes read.
    pub fn read_full(&self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let got = self.read(&mut buf[total..])?;
            if got == 0 {
                break;
            }
            total += got;
        }
        Ok(total)
    }

    /// Drain the stream into a freshly allocated vector.
    pub fn read_to_end(&self, size_hint: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(size_hint);
        let mut chunk = [0u8; SKIP_CHUNK];
        loop {
            let got = self.read(&mut chunk)?;
            if got == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..got]);
        }
        Ok(out)
    }

    /// Release this handle's share. Idempotent: later calls are no-ops.
    pub fn close(&mut self) {
        self.inner = None;
    }

    /// True once this handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Number of live shares of the underlying stream (0 once closed).
    pub fn share_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }
}

impl Clone for StreamHandle {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("closed", &self.is_closed())
            .field("shares", &self.share_count())
            .finish()
    }
}

fn lock<'a>(
    inner: &'a Arc<Mutex<Box<dyn Stream>>>,
) -> Result<std::sync::MutexGuard<'a, Box<dyn Stream>>> {
    inner
        .lock()
        .map_err(|_| Error::generic("stream handle lock poisoned"))
}
