use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Soft errors reported by the stream decoder.
///
/// Every variant leaves the decoder back in frame search; feeding more bytes
/// is always a valid way to recover.
///
/// # Examples
/// ```
/// use tic_core::DecodeError;
///
/// let err = DecodeError::ChecksumMismatch { received: 0x41, computed: 0x42 };
/// assert!(err.to_string().contains("checksum mismatch"));
/// assert_eq!(err.kind(), tic_core::ErrorKind::ChecksumMismatch);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("parity error on byte 0x{byte:02x}")]
    Parity { byte: u8 },
    #[error("unexpected byte 0x{byte:02x} while waiting for dataset start or frame stop")]
    Framing { byte: u8 },
    #[error("dataset name longer than {max} bytes")]
    NameTooLong { max: usize },
    #[error("checksum mismatch: received 0x{received:02x}, computed 0x{computed:02x}")]
    ChecksumMismatch { received: u8, computed: u8 },
    #[error("protocol violation: {reason}")]
    ProtocolViolation { reason: &'static str },
    #[error("invalid field count: {separators} separators")]
    InvalidFieldCount { separators: usize },
    #[error("dataset longer than {capacity} bytes")]
    PayloadTooLong { capacity: usize },
}

/// Fieldless view of [`DecodeError`], used for counting and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parity,
    Framing,
    NameTooLong,
    ChecksumMismatch,
    ProtocolViolation,
    InvalidFieldCount,
    PayloadTooLong,
}

impl ErrorKind {
    /// All kinds in report order.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Parity,
        ErrorKind::Framing,
        ErrorKind::NameTooLong,
        ErrorKind::ChecksumMismatch,
        ErrorKind::ProtocolViolation,
        ErrorKind::InvalidFieldCount,
        ErrorKind::PayloadTooLong,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Parity => "parity",
            ErrorKind::Framing => "framing",
            ErrorKind::NameTooLong => "name_too_long",
            ErrorKind::ChecksumMismatch => "checksum_mismatch",
            ErrorKind::ProtocolViolation => "protocol_violation",
            ErrorKind::InvalidFieldCount => "invalid_field_count",
            ErrorKind::PayloadTooLong => "payload_too_long",
        }
    }
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Parity { .. } => ErrorKind::Parity,
            DecodeError::Framing { .. } => ErrorKind::Framing,
            DecodeError::NameTooLong { .. } => ErrorKind::NameTooLong,
            DecodeError::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            DecodeError::ProtocolViolation { .. } => ErrorKind::ProtocolViolation,
            DecodeError::InvalidFieldCount { .. } => ErrorKind::InvalidFieldCount,
            DecodeError::PayloadTooLong { .. } => ErrorKind::PayloadTooLong,
        }
    }
}
