use super::{ByteSource, SourceError};

/// In-memory source over a byte slice.
///
/// # Examples
/// ```
/// use tic_core::{ByteSource, SliceSource};
///
/// let mut source = SliceSource::new(&[0x02, 0x03]);
/// assert!(source.available());
/// assert_eq!(source.read_byte().unwrap(), Some(0x02));
/// assert_eq!(source.remaining(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl ByteSource for SliceSource<'_> {
    fn available(&mut self) -> bool {
        self.position < self.bytes.len()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }

    fn fill(&mut self) -> Result<bool, SourceError> {
        Ok(self.available())
    }
}
