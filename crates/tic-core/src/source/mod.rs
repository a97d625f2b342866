//! Byte sources feeding the decoder.
//!
//! A source only moves forward: reads consume bytes and nothing is ever
//! pushed back. All buffering of unread bytes is the source's business.

mod reader;
mod slice;

pub use reader::ReaderSource;
pub use slice::SliceSource;

use thiserror::Error;

pub trait ByteSource {
    /// Whether a byte can be read right now without waiting.
    fn available(&mut self) -> bool;

    /// Read the next byte, `Ok(None)` once the source is exhausted.
    fn read_byte(&mut self) -> Result<Option<u8>, SourceError>;

    /// Wait until bytes are available. `Ok(false)` once the input has ended.
    fn fill(&mut self) -> Result<bool, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn fill(&mut self) -> Result<bool, SourceError> {
        (**self).fill()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).read_byte()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
