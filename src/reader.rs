//! Byte sources for the decoder.
//!
//! Every stage of FCS decoding addresses the source by absolute offset, so the
//! decoder only needs "give me these bytes" and "how long are you". The
//! [`ByteRangeReader`] trait captures exactly that, letting the same decoder
//! run over a file path, an already open handle, an in-memory buffer or any
//! other ranged source.

use crate::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

/// Trait for reading byte ranges from different sources (files, buffers, HTTP, etc.)
pub trait ByteRangeReader {
    type Error;

    /// Read `length` bytes starting at `offset`.
    fn read_range(
        &mut self,
        offset: u64,
        length: u64,
    ) -> core::result::Result<Vec<u8>, Self::Error>;

    /// Total length of the source in bytes.
    fn size(&mut self) -> core::result::Result<u64, Self::Error>;
}

/// Range reader over any seekable handle.
///
/// Defaults to a [`File`]; wrap a [`std::io::Cursor`] to decode from memory.
/// The handle is dropped (and a file closed) together with the reader.
pub struct FileRangeReader<R = File> {
    inner: R,
}

impl FileRangeReader<File> {
    /// Open `file_path` for reading.
    pub fn new(file_path: &str) -> Result<Self> {
        let file = File::open(file_path).map_err(Error::IOError)?;
        Ok(Self { inner: file })
    }
}

impl<R: Read + Seek> FileRangeReader<R> {
    /// Wrap an already open handle.
    pub fn from_handle(inner: R) -> Self {
        Self { inner }
    }

    /// Give the handle back.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteRangeReader for FileRangeReader<R> {
    type Error = Error;

    fn read_range(
        &mut self,
        offset: u64,
        length: u64,
    ) -> core::result::Result<Vec<u8>, Self::Error> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map_err(Error::IOError)?;

        let mut buffer = vec![0u8; length as usize];
        self.inner.read_exact(&mut buffer).map_err(Error::IOError)?;

        Ok(buffer)
    }

    fn size(&mut self) -> core::result::Result<u64, Self::Error> {
        self.inner.seek(SeekFrom::End(0)).map_err(Error::IOError)
    }
}

/// Buffered file reader with read-ahead caching for better I/O performance.
///
/// The header and TEXT segment are read as many small ranges close to the
/// start of the file; this reader serves them from one prefetched block.
pub struct BufferedRangeReader {
    file: File,
    buffer: Vec<u8>,
    buffer_start: u64,
    buffer_end: u64,
    buffer_capacity: usize,
}

impl BufferedRangeReader {
    /// Create a new buffered reader with the default buffer size (64 KB).
    pub fn new(file_path: &str) -> Result<Self> {
        Self::with_capacity(file_path, 64 * 1024)
    }

    /// Create a new buffered reader with a custom buffer size.
    pub fn with_capacity(file_path: &str, capacity: usize) -> Result<Self> {
        let file = File::open(file_path).map_err(Error::IOError)?;
        Ok(Self {
            file,
            buffer: Vec::with_capacity(capacity),
            buffer_start: 0,
            buffer_end: 0,
            buffer_capacity: capacity,
        })
    }

    /// Fill the internal buffer starting at the given offset.
    fn fill_buffer(&mut self, offset: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(Error::IOError)?;

        self.buffer.clear();
        self.buffer.resize(self.buffer_capacity, 0);

        let mut filled = 0;
        while filled < self.buffer.len() {
            let n = self
                .file
                .read(&mut self.buffer[filled..])
                .map_err(Error::IOError)?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        self.buffer.truncate(filled);
        self.buffer_start = offset;
        self.buffer_end = offset + filled as u64;

        Ok(())
    }

    fn slice(&self, offset: u64, length: u64) -> Vec<u8> {
        let start_idx = (offset - self.buffer_start) as usize;
        let end_idx = start_idx + length as usize;
        self.buffer[start_idx..end_idx].to_vec()
    }
}

impl ByteRangeReader for BufferedRangeReader {
    type Error = Error;

    fn read_range(
        &mut self,
        offset: u64,
        length: u64,
    ) -> core::result::Result<Vec<u8>, Self::Error> {
        let end = offset + length;

        // Requested range is fully within the buffer
        if offset >= self.buffer_start && end <= self.buffer_end {
            return Ok(self.slice(offset, length));
        }

        // Larger than the buffer: read directly
        if length as usize > self.buffer_capacity {
            self.file
                .seek(SeekFrom::Start(offset))
                .map_err(Error::IOError)?;
            let mut buffer = vec![0u8; length as usize];
            self.file.read_exact(&mut buffer).map_err(Error::IOError)?;
            return Ok(buffer);
        }

        self.fill_buffer(offset)?;

        if end <= self.buffer_end {
            Ok(self.slice(offset, length))
        } else {
            // Near end of file
            Err(Error::TooShortBuffer {
                actual: (self.buffer_end - offset) as usize,
                expected: length as usize,
                file: file!(),
                line: line!(),
            })
        }
    }

    fn size(&mut self) -> core::result::Result<u64, Self::Error> {
        Ok(self.file.metadata().map_err(Error::IOError)?.len())
    }
}
