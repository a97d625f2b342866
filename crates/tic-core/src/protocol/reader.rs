use super::error::DecodeError;
use super::generation::Generation;
use super::layout;

/// Check the parity of a raw wire byte.
///
/// The link runs 7 data bits with even parity: a valid byte always holds an
/// even number of set bits once the parity bit is counted.
///
/// # Examples
/// ```
/// use tic_core::protocol::reader::has_valid_parity;
///
/// assert!(has_valid_parity(b'A')); // two data bits set, parity bit clear
/// assert!(!has_valid_parity(b'A' | 0x80));
/// assert!(has_valid_parity(b'C' | 0x80));
/// ```
pub fn has_valid_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

pub fn strip_parity(byte: u8) -> u8 {
    byte & layout::DATA_MASK
}

/// Checksum of a run of dataset bytes, mapped into the printable range.
///
/// # Examples
/// ```
/// use tic_core::protocol::reader::checksum;
///
/// assert_eq!(checksum(b"ADCO 031528123456"), b'?');
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    (sum & layout::CHECKSUM_MASK) + layout::CHECKSUM_OFFSET
}

/// Borrowed dataset fields, before truncation to the output caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetFields<'a> {
    pub name: &'a [u8],
    pub timestamp: &'a [u8],
    pub value: &'a [u8],
}

/// Safe access to one completed dataset: everything between the dataset
/// start and stop markers, checksum byte last.
pub struct DatasetReader<'a> {
    bytes: &'a [u8],
    generation: Generation,
}

impl<'a> DatasetReader<'a> {
    pub fn new(bytes: &'a [u8], generation: Generation) -> Self {
        Self { bytes, generation }
    }

    pub fn received_checksum(&self) -> Result<u8, DecodeError> {
        self.bytes
            .last()
            .copied()
            .ok_or(DecodeError::ProtocolViolation {
                reason: "dataset has no checksum byte",
            })
    }

    pub fn computed_checksum(&self) -> Result<u8, DecodeError> {
        let end = self
            .bytes
            .len()
            .checked_sub(self.generation.checksum_excluded_tail())
            .ok_or(DecodeError::ProtocolViolation {
                reason: "dataset too short for its checksum scope",
            })?;
        Ok(checksum(&self.bytes[..end]))
    }

    pub fn verify_checksum(&self) -> Result<(), DecodeError> {
        let received = self.received_checksum()?;
        let computed = self.computed_checksum()?;
        if received != computed {
            return Err(DecodeError::ChecksumMismatch { received, computed });
        }
        Ok(())
    }

    /// Dataset bytes without the trailing checksum.
    pub fn content(&self) -> &'a [u8] {
        let end = self.bytes.len().saturating_sub(layout::CHECKSUM_LEN);
        &self.bytes[..end]
    }

    /// Split the content on the dataset separator.
    ///
    /// Two separators give `name` and `value`; three give `name`, `timestamp`
    /// and `value`. Only the first three positions are kept, further
    /// separators still count towards the total.
    pub fn split_fields(&self) -> Result<DatasetFields<'a>, DecodeError> {
        let content = self.content();
        let separator = self.generation.separator();
        let mut positions = [0usize; layout::MAX_SEPARATOR_POSITIONS];
        let mut count = 0usize;
        for (idx, byte) in content.iter().enumerate() {
            if *byte == separator {
                if let Some(slot) = positions.get_mut(count) {
                    *slot = idx;
                }
                count += 1;
            }
        }

        let fields = match count {
            2 => DatasetFields {
                name: &content[..positions[0]],
                timestamp: &[],
                value: &content[positions[0] + 1..positions[1]],
            },
            3 => DatasetFields {
                name: &content[..positions[0]],
                timestamp: &content[positions[0] + 1..positions[1]],
                value: &content[positions[1] + 1..positions[2]],
            },
            separators => return Err(DecodeError::InvalidFieldCount { separators }),
        };

        if fields.name.is_empty() {
            return Err(DecodeError::ProtocolViolation {
                reason: "empty dataset name",
            });
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetReader, checksum, has_valid_parity, strip_parity};
    use crate::protocol::error::DecodeError;
    use crate::protocol::generation::Generation;

    #[test]
    fn parity_counts_all_bits() {
        assert!(has_valid_parity(0x00));
        assert!(has_valid_parity(0x82));
        assert!(!has_valid_parity(0x02));
        assert!(!has_valid_parity(0x80));
    }

    #[test]
    fn strip_parity_keeps_low_bits() {
        assert_eq!(strip_parity(0x8A), 0x0A);
        assert_eq!(strip_parity(0x41), 0x41);
    }

    #[test]
    fn checksum_is_printable() {
        assert_eq!(checksum(b""), 0x20);
        for byte in 0u8..=0x7F {
            let sum = checksum(&[byte, byte, byte]);
            assert!((0x20..=0x5F).contains(&sum));
        }
    }

    #[test]
    fn historic_checksum_skips_final_separator() {
        let reader = DatasetReader::new(b"ADCO 031528123456 ?", Generation::Historic);
        assert!(reader.verify_checksum().is_ok());
    }

    #[test]
    fn standard_checksum_covers_final_separator() {
        let reader = DatasetReader::new(
            b"SINSTS\te190223132520\t00290\t]",
            Generation::Standard,
        );
        assert!(reader.verify_checksum().is_ok());
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let reader = DatasetReader::new(b"ADCO 031528123456 @", Generation::Historic);
        let err = reader.verify_checksum().unwrap_err();
        assert_eq!(
            err,
            DecodeError::ChecksumMismatch {
                received: b'@',
                computed: b'?',
            }
        );
    }

    #[test]
    fn historic_scope_needs_two_bytes() {
        let reader = DatasetReader::new(b" ", Generation::Historic);
        let err = reader.verify_checksum().unwrap_err();
        assert!(matches!(err, DecodeError::ProtocolViolation { .. }));
    }

    #[test]
    fn split_two_fields() {
        let reader = DatasetReader::new(b"ADCO 031528123456 ?", Generation::Historic);
        let fields = reader.split_fields().unwrap();
        assert_eq!(fields.name, b"ADCO");
        assert_eq!(fields.timestamp, b"");
        assert_eq!(fields.value, b"031528123456");
    }

    #[test]
    fn split_three_fields() {
        let reader = DatasetReader::new(
            b"SINSTS\te190223132520\t00290\t]",
            Generation::Standard,
        );
        let fields = reader.split_fields().unwrap();
        assert_eq!(fields.name, b"SINSTS");
        assert_eq!(fields.timestamp, b"e190223132520");
        assert_eq!(fields.value, b"00290");
    }

    #[test]
    fn split_ignores_other_generation_separator() {
        let reader = DatasetReader::new(b"PJOURF+1\t00008001 NONUTILE\t?", Generation::Standard);
        let fields = reader.split_fields().unwrap();
        assert_eq!(fields.name, b"PJOURF+1");
        assert_eq!(fields.value, b"00008001 NONUTILE");
    }

    #[test]
    fn split_rejects_bad_separator_counts() {
        for (bytes, expected) in [
            (&b"ADCO?"[..], 0usize),
            (&b"ADCO 0315?"[..], 1),
            (&b"A B C D E ?"[..], 5),
        ] {
            let reader = DatasetReader::new(bytes, Generation::Historic);
            let err = reader.split_fields().unwrap_err();
            assert_eq!(
                err,
                DecodeError::InvalidFieldCount {
                    separators: expected
                }
            );
        }
    }

    #[test]
    fn split_rejects_empty_name() {
        let reader = DatasetReader::new(b" 0315 ?", Generation::Historic);
        let err = reader.split_fields().unwrap_err();
        assert!(matches!(err, DecodeError::ProtocolViolation { .. }));
    }
}
