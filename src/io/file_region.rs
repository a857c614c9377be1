//! File-region byte source
//!
//! A [`SharedFile`] is one random-access file handle shared by any number of
//! [`FileRegionStream`] windows. Each read seeks to the window's position,
//! reads, and restores the file's prior position, all inside the file's
//! critical section, so concurrent windows never corrupt each other's
//! position.

use crate::error::{Error, Result};
use crate::io::stream::Stream;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A random-access file handle shared between region windows.
#[derive(Clone)]
pub struct SharedFile {
    file: Arc<Mutex<File>>,
}

impl SharedFile {
    /// Open a file for shared region access.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(Error::System)?;
        Ok(Self::from_file(file))
    }

    /// Share an already-open file.
    pub fn from_file(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }

    /// Total length of the underlying file.
    pub fn len(&self) -> Result<u64> {
        let file = self.lock()?;
        Ok(file.metadata().map_err(Error::System)?.len())
    }

    /// True if the underlying file is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// A stream over the `(offset, length)` window. `length` of `None`
    /// leaves the window unbounded above.
    pub fn region(&self, offset: u64, length: Option<u64>) -> FileRegionStream {
        FileRegionStream {
            file: self.file.clone(),
            offset,
            length,
            pos: 0,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| Error::generic("shared file lock poisoned"))
    }
}

/// A stream over an `(offset, length)` window of a [`SharedFile`].
pub struct FileRegionStream {
    file: Arc<Mutex<File>>,
    offset: u64,
    length: Option<u64>,
    pos: u64,
}

impl FileRegionStream {
    /// Bytes remaining below the window's declared length, if bounded.
    fn remaining(&self) -> Option<u64> {
        self.length.map(|len| len.saturating_sub(self.pos))
    }
}

impl Stream for FileRegionStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = match self.remaining() {
            Some(rem) => buf.len().min(rem as usize),
            None => buf.len(),
        };
        if want == 0 {
            return Ok(0);
        }

        let mut file = self
            .file
            .lock()
            .map_err(|_| Error::generic("shared file lock poisoned"))?;

        // seek + read + restore must stay inside this critical section
        let saved = file.stream_position().map_err(Error::System)?;
        file.seek(SeekFrom::Start(self.offset + self.pos))
            .map_err(Error::System)?;
        let got = file.read(&mut buf[..want]).map_err(Error::System)?;
        file.seek(SeekFrom::Start(saved)).map_err(Error::System)?;

        self.pos += got as u64;
        Ok(got)
    }

    fn reset(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }
}
