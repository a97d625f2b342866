use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dataset buffer full ({capacity} bytes)")]
pub struct BufferFull {
    pub capacity: usize,
}

/// Accumulation buffer for one dataset, bounded to a fixed capacity.
///
/// The storage is allocated once; appends past the capacity are refused
/// instead of growing the buffer.
#[derive(Debug, Clone)]
pub struct DatasetBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl DatasetBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, byte: u8) -> Result<(), BufferFull> {
        if self.is_full() {
            return Err(BufferFull {
                capacity: self.capacity,
            });
        }
        self.bytes.push(byte);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bytes.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferFull, DatasetBuffer};

    #[test]
    fn push_until_full() {
        let mut buffer = DatasetBuffer::new(3);
        for byte in b"abc" {
            buffer.push(*byte).unwrap();
        }
        assert!(buffer.is_full());
        assert_eq!(buffer.push(b'd'), Err(BufferFull { capacity: 3 }));
        assert_eq!(buffer.as_slice(), b"abc");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buffer = DatasetBuffer::new(2);
        buffer.push(1).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
        buffer.push(2).unwrap();
        buffer.push(3).unwrap();
        assert_eq!(buffer.len(), 2);
    }
}
