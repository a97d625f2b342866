//! Wire encoder for TIC frames.
//!
//! Produces 7-bit frames with correct checksums; [`apply_parity`] turns them
//! into wire bytes. Used to build capture fixtures and to simulate a meter.

use super::generation::Generation;
use super::layout;
use super::reader::checksum;

/// Set the parity bit so the byte carries an even number of ones.
///
/// # Examples
/// ```
/// use tic_core::protocol::encoder::with_parity;
///
/// assert_eq!(with_parity(b'A'), b'A');
/// assert_eq!(with_parity(b'C'), b'C' | 0x80);
/// ```
pub fn with_parity(byte: u8) -> u8 {
    let data = byte & layout::DATA_MASK;
    if data.count_ones() % 2 == 1 {
        data | layout::PARITY_BIT
    } else {
        data
    }
}

pub fn apply_parity(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().map(with_parity).collect()
}

/// Encode one dataset, dataset start and stop markers included.
///
/// An empty `timestamp` produces a two-field dataset.
///
/// # Examples
/// ```
/// use tic_core::Generation;
/// use tic_core::protocol::encoder::encode_dataset;
///
/// let bytes = encode_dataset(Generation::Historic, "ADCO", "", "031528123456");
/// assert_eq!(bytes, b"\nADCO 031528123456 ?\r");
/// ```
pub fn encode_dataset(generation: Generation, name: &str, timestamp: &str, value: &str) -> Vec<u8> {
    let separator = generation.separator();
    let mut content = Vec::with_capacity(name.len() + timestamp.len() + value.len() + 3);
    content.extend_from_slice(name.as_bytes());
    content.push(separator);
    if !timestamp.is_empty() {
        content.extend_from_slice(timestamp.as_bytes());
        content.push(separator);
    }
    content.extend_from_slice(value.as_bytes());

    let sum = match generation {
        Generation::Historic => checksum(&content),
        Generation::Standard => {
            content.push(separator);
            checksum(&content)
        }
    };
    if generation == Generation::Historic {
        content.push(separator);
    }

    let mut bytes = Vec::with_capacity(content.len() + 3);
    bytes.push(layout::DATASET_START);
    bytes.extend_from_slice(&content);
    bytes.push(sum);
    bytes.push(layout::DATASET_STOP);
    bytes
}

/// Builder for one frame of datasets.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            bytes: vec![layout::FRAME_START],
        }
    }

    pub fn dataset(mut self, generation: Generation, name: &str, timestamp: &str, value: &str) -> Self {
        self.bytes
            .extend(encode_dataset(generation, name, timestamp, value));
        self
    }

    /// Append bytes verbatim, e.g. a hand-corrupted dataset.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Close the frame and return its 7-bit bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(layout::FRAME_STOP);
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameBuilder, apply_parity, encode_dataset, with_parity};
    use crate::protocol::generation::Generation;
    use crate::protocol::reader::has_valid_parity;

    #[test]
    fn parity_is_always_valid() {
        for byte in 0u8..=0x7F {
            let wire = with_parity(byte);
            assert!(has_valid_parity(wire));
            assert_eq!(wire & 0x7F, byte);
        }
    }

    #[test]
    fn standard_dataset_with_timestamp() {
        let bytes = encode_dataset(Generation::Standard, "SINSTS", "e190223132520", "00290");
        assert_eq!(bytes, b"\nSINSTS\te190223132520\t00290\t]\r");
    }

    #[test]
    fn frame_wraps_datasets() {
        let frame = FrameBuilder::new()
            .dataset(Generation::Historic, "IINST", "", "002")
            .finish();
        assert_eq!(frame, b"\x02\nIINST 002 Y\r\x03");
        assert!(apply_parity(&frame).into_iter().all(has_valid_parity));
    }
}
