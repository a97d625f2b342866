use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use super::{ByteSource, SourceError};

const READER_BUFFER_SIZE: usize = 4 * 1024;

/// Source backed by any reader: capture files, pipes, or a serial character
/// device the operator already configured.
///
/// `available` only looks at bytes already buffered. Reading from the
/// underlying reader happens in `fill`, which blocks on an idle device.
pub struct ReaderSource<R> {
    inner: BufReader<R>,
    exhausted: bool,
}

impl ReaderSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READER_BUFFER_SIZE, inner),
            exhausted: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn available(&mut self) -> bool {
        !self.inner.buffer().is_empty()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SourceError> {
        if !self.available() && !self.fill()? {
            return Ok(None);
        }
        let byte = self.inner.buffer().first().copied();
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }

    fn fill(&mut self) -> Result<bool, SourceError> {
        if self.available() {
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => {
                    self.exhausted = buf.is_empty();
                    return Ok(!self.exhausted);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
    }
}
