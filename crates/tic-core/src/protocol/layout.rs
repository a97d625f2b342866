//! Wire-level constants of the TIC link.

pub const FRAME_START: u8 = 0x02;
pub const FRAME_STOP: u8 = 0x03;

pub const DATASET_START: u8 = 0x0A;
pub const DATASET_STOP: u8 = 0x0D;

pub const SEPARATOR_STANDARD: u8 = 0x09;
pub const SEPARATOR_HISTORIC: u8 = 0x20;

pub const PARITY_BIT: u8 = 0x80;
pub const DATA_MASK: u8 = 0x7F;

pub const CHECKSUM_MASK: u8 = 0x3F;
pub const CHECKSUM_OFFSET: u8 = 0x20;
pub const CHECKSUM_LEN: usize = 1;

/// Field splitting only ever looks at the first three separators.
pub const MAX_SEPARATOR_POSITIONS: usize = 3;

pub const NAME_MAX: usize = 8;
pub const TIMESTAMP_MAX: usize = 13;
pub const VALUE_MAX: usize = 98;
pub const COMPACT_VALUE_MAX: usize = 12;

/// Separators a dataset may hold around name, timestamp and value.
pub const SEPARATOR_COUNT: usize = 3;
/// Largest accumulation buffer a decoder accepts; positions fit in a byte.
pub const MAX_BUFFER_CAPACITY: usize = u8::MAX as usize;
pub const STANDARD_BUFFER_CAPACITY: usize =
    NAME_MAX + TIMESTAMP_MAX + VALUE_MAX + SEPARATOR_COUNT + CHECKSUM_LEN;
