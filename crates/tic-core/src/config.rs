//! Decoder configuration.
//!
//! Field caps bound both the output record and the accumulation buffer. Two
//! presets exist: `STANDARD` sized for the longest datasets of either
//! generation, and `COMPACT` for readers that only need short values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("field caps need a buffer larger than {max} bytes")]
    BufferTooLarge { max: usize },
}

/// Maximum length of each dataset field.
///
/// # Examples
/// ```
/// use tic_core::FieldLimits;
///
/// assert_eq!(FieldLimits::STANDARD.buffer_capacity(), Ok(123));
/// assert_eq!(FieldLimits::COMPACT.buffer_capacity(), Ok(37));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLimits {
    pub name_max: usize,
    pub timestamp_max: usize,
    pub value_max: usize,
}

impl FieldLimits {
    pub const STANDARD: FieldLimits = FieldLimits {
        name_max: layout::NAME_MAX,
        timestamp_max: layout::TIMESTAMP_MAX,
        value_max: layout::VALUE_MAX,
    };

    pub const COMPACT: FieldLimits = FieldLimits {
        name_max: layout::NAME_MAX,
        timestamp_max: layout::TIMESTAMP_MAX,
        value_max: layout::COMPACT_VALUE_MAX,
    };

    /// Size of the accumulation buffer: every field, three separators and
    /// the checksum byte. Fails past `layout::MAX_BUFFER_CAPACITY`.
    pub fn buffer_capacity(&self) -> Result<usize, ConfigError> {
        [
            self.timestamp_max,
            self.value_max,
            layout::SEPARATOR_COUNT,
            layout::CHECKSUM_LEN,
        ]
        .into_iter()
        .try_fold(self.name_max, usize::checked_add)
        .filter(|capacity| *capacity <= layout::MAX_BUFFER_CAPACITY)
        .ok_or(ConfigError::BufferTooLarge {
            max: layout::MAX_BUFFER_CAPACITY,
        })
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        FieldLimits::STANDARD
    }
}

/// What the decoder does when a dataset outgrows its buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the dataset and go back to frame search without reporting.
    #[default]
    Resync,
    /// Drop the dataset and report `DecodeError::PayloadTooLong`.
    Report,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub limits: FieldLimits,
    pub overflow: OverflowPolicy,
}

impl DecoderConfig {
    pub fn compact() -> Self {
        Self {
            limits: FieldLimits::COMPACT,
            ..Self::default()
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_value_max(mut self, value_max: usize) -> Self {
        self.limits.value_max = value_max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DecoderConfig, FieldLimits, OverflowPolicy};

    #[test]
    fn default_is_standard_resync() {
        let config = DecoderConfig::default();
        assert_eq!(config.limits, FieldLimits::STANDARD);
        assert_eq!(config.overflow, OverflowPolicy::Resync);
    }

    #[test]
    fn value_override_grows_buffer() {
        let config = DecoderConfig::compact().with_value_max(20);
        assert_eq!(config.limits.buffer_capacity(), Ok(45));
    }

    #[test]
    fn oversized_caps_are_rejected() {
        let too_large = ConfigError::BufferTooLarge { max: 255 };
        let config = DecoderConfig::default().with_value_max(usize::MAX);
        assert_eq!(config.limits.buffer_capacity(), Err(too_large));
        let config = DecoderConfig::default().with_value_max(4_000_000_000_000);
        assert_eq!(config.limits.buffer_capacity(), Err(too_large));
        let config = DecoderConfig::default().with_value_max(230);
        assert_eq!(config.limits.buffer_capacity(), Ok(255));
        let config = DecoderConfig::default().with_value_max(231);
        assert_eq!(config.limits.buffer_capacity(), Err(too_large));
    }

    #[test]
    fn config_serializes_policy_in_snake_case() {
        let config = DecoderConfig::default().with_overflow(OverflowPolicy::Report);
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value["overflow"], "report");
        assert_eq!(value["limits"]["value_max"], 98);
    }
}
