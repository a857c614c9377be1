//! Pass-through filter wrappers
//!
//! [`InFilter`] and [`OutFilter`] are the seam concrete codecs attach to: a
//! codec embeds one and delegates I/O to the inner stream or sink. Once the
//! inner handle has been released, an `InFilter` reads as an empty stream
//! and an `OutFilter` swallows writes; callers must treat that as terminal,
//! not retryable.

use crate::error::Result;
use crate::io::sink::SinkHandle;
use crate::io::stream::StreamHandle;

/// Read-side decorator over an inner stream handle.
pub struct InFilter {
    inner: Option<StreamHandle>,
}

impl InFilter {
    pub fn new(inner: StreamHandle) -> Self {
        Self { inner: Some(inner) }
    }

    /// Read from the inner stream; 0 bytes once closed.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        match &self.inner {
            Some(inner) => inner.read(buf),
            None => Ok(0),
        }
    }

    /// Read one byte from the inner stream; `None` once closed.
    pub fn read_byte(&self) -> Result<Option<u8>> {
        match &self.inner {
            Some(inner) => inner.read_byte(),
            None => Ok(None),
        }
    }

    /// Skip inner bytes; 0 once closed.
    pub fn skip(&self, n: usize) -> Result<usize> {
        match &self.inner {
            Some(inner) => inner.skip(n),
            None => Ok(0),
        }
    }

    /// Drain the inner stream to its end.
    pub fn read_to_end(&self, size_hint: usize) -> Result<Vec<u8>> {
        match &self.inner {
            Some(inner) => inner.read_to_end(size_hint),
            None => Ok(Vec::new()),
        }
    }

    /// Release this wrapper's share of the inner stream. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            inner.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

/// Write-side decorator over an inner sink handle.
pub struct OutFilter {
    inner: Option<SinkHandle>,
}

impl OutFilter {
    pub fn new(inner: SinkHandle) -> Self {
        Self { inner: Some(inner) }
    }

    /// Write to the inner sink; a silent no-op once closed.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        match &self.inner {
            Some(inner) => inner.write(buf),
            None => Ok(()),
        }
    }

    /// Flush the inner sink; a no-op once closed.
    pub fn flush(&self) -> Result<()> {
        match &self.inner {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }

    /// Release this wrapper's share of the inner sink. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut inner) => inner.close(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}
