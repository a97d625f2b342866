use serde::{Deserialize, Serialize};

use super::layout;

/// Protocol generation, fixed per dataset by the first separator seen.
///
/// The generation decides both the separator byte used for field splitting
/// and how much of the dataset the checksum covers.
///
/// # Examples
/// ```
/// use tic_core::Generation;
///
/// assert_eq!(Generation::from_separator(b' '), Some(Generation::Historic));
/// assert_eq!(Generation::from_separator(b'\t'), Some(Generation::Standard));
/// assert_eq!(Generation::from_separator(b'A'), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    /// Space-separated datasets; the final separator is outside the checksum.
    Historic,
    /// Tab-separated datasets; the final separator is inside the checksum.
    Standard,
}

impl Generation {
    pub fn from_separator(byte: u8) -> Option<Self> {
        match byte {
            layout::SEPARATOR_HISTORIC => Some(Generation::Historic),
            layout::SEPARATOR_STANDARD => Some(Generation::Standard),
            _ => None,
        }
    }

    pub fn separator(self) -> u8 {
        match self {
            Generation::Historic => layout::SEPARATOR_HISTORIC,
            Generation::Standard => layout::SEPARATOR_STANDARD,
        }
    }

    /// Number of trailing dataset bytes left out of the checksum sum,
    /// counting the checksum byte itself.
    pub(crate) fn checksum_excluded_tail(self) -> usize {
        match self {
            Generation::Historic => 2,
            Generation::Standard => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn separator_roundtrips() {
        for generation in [Generation::Historic, Generation::Standard] {
            assert_eq!(
                Generation::from_separator(generation.separator()),
                Some(generation)
            );
        }
    }

    #[test]
    fn historic_excludes_final_separator() {
        assert_eq!(Generation::Historic.checksum_excluded_tail(), 2);
        assert_eq!(Generation::Standard.checksum_excluded_tail(), 1);
    }
}
