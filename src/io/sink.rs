//! Sink contract and shared sink handles
//!
//! The write-side counterpart of [`crate::io::stream`]: encode wrappers
//! deliver their output through [`Sink`]s held by shared, idempotently
//! closing [`SinkHandle`]s.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::sync::{Arc, Mutex};

/// The minimal capability set of a writable byte sink.
///
/// `close` lets a sink emit any trailer it owes exactly once; since shared
/// handles may forward `close` more than once, implementations must make it
/// idempotent.
pub trait Sink: Send {
    /// Write all of `buf`.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Push buffered bytes towards the underlying medium.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Finish the sink's output. Idempotent.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A shared, reference-counted handle to a [`Sink`].
///
/// Mirrors [`crate::io::stream::StreamHandle`]: cloning shares the sink,
/// `close` releases only this handle's share (forwarding the sink's own
/// `close` first), and a closed handle swallows writes as silent no-ops.
pub struct SinkHandle {
    inner: Option<Arc<Mutex<Box<dyn Sink>>>>,
}

impl SinkHandle {
    /// Wrap a sink in a new shared handle.
    pub fn new<S: Sink + 'static>(sink: S) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(sink)))),
        }
    }

    /// Write all of `buf`. A closed handle accepts and discards the bytes.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        match &self.inner {
            Some(inner) => lock(inner)?.write(buf),
            None => Ok(()),
        }
    }

    /// Flush buffered bytes. A closed handle is a no-op.
    pub fn flush(&self) -> Result<()> {
        match &self.inner {
            Some(inner) => lock(inner)?.flush(),
            None => Ok(()),
        }
    }

    /// Finish the sink and release this handle's share. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(inner) = self.inner.take() {
            lock(&inner)?.close()?;
        }
        Ok(())
    }

    /// True once this handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Number of live shares of the underlying sink (0 once closed).
    pub fn share_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }
}

impl Clone for SinkHandle {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkHandle")
            .field("closed", &self.is_closed())
            .field("shares", &self.share_count())
            .finish()
    }
}

fn lock<'a>(
    inner: &'a Arc<Mutex<Box<dyn Sink>>>,
) -> Result<std::sync::MutexGuard<'a, Box<dyn Sink>>> {
    inner
        .lock()
        .map_err(|_| Error::generic("sink handle lock poisoned"))
}

/// A sink collecting everything written into shared memory.
///
/// Clones share the same backing storage, so the producer can hold the sink
/// while the consumer keeps a clone to snapshot the contents from.
#[derive(Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<BytesMut>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Bytes {
        self.data
            .lock()
            .map(|guard| Bytes::copy_from_slice(&guard))
            .unwrap_or_default()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| Error::generic("memory sink lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(())
    }
}
