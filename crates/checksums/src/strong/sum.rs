use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Width of a strong sum in bytes (SHA-1).
pub const STRONG_LEN: usize = 20;

/// Strong checksum identifying a block, file, or directory by content.
#[derive(Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StrongSum([u8; STRONG_LEN]);

impl StrongSum {
    /// Wraps raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; STRONG_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a strong sum from a slice, returning `None` unless it holds
    /// exactly [`STRONG_LEN`] bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; STRONG_LEN]>::try_from(bytes).ok().map(Self)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; STRONG_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for StrongSum {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StrongSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for StrongSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrongSum({self})")
    }
}

/// Error returned when parsing a [`StrongSum`] from its hex form.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StrongSumParseError {
    /// The input does not contain exactly `2 * STRONG_LEN` characters.
    #[error("strong sum requires {expected} hex digits, received {len}")]
    Length {
        /// Number of characters expected.
        expected: usize,
        /// Number of characters received.
        len: usize,
    },
    /// The input contains a character that is not a hex digit.
    #[error("invalid hex digit {digit:?} at offset {offset}")]
    Digit {
        /// Offending character.
        digit: char,
        /// Byte offset of the character in the input.
        offset: usize,
    },
}

impl FromStr for StrongSum {
    type Err = StrongSumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != STRONG_LEN * 2 {
            return Err(StrongSumParseError::Length {
                expected: STRONG_LEN * 2,
                len: s.len(),
            });
        }

        let mut bytes = [0u8; STRONG_LEN];
        for (offset, ch) in s.char_indices() {
            let nibble = ch
                .to_digit(16)
                .ok_or(StrongSumParseError::Digit { digit: ch, offset })?;
            let slot = &mut bytes[offset / 2];
            *slot = (*slot << 4) | nibble as u8;
        }
        Ok(Self(bytes))
    }
}
