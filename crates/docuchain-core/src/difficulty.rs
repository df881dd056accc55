//! Proof-of-work difficulty.
//!
//! Difficulty is the number of leading zero hex digits a block hash must
//! have. Each additional digit multiplies the expected work by 16.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::BlockHash;

/// Highest accepted difficulty.
pub const MAX_DIFFICULTY: u8 = 8;

/// Difficulty used when none is configured.
pub const DEFAULT_DIFFICULTY: u8 = 2;

/// Number of leading zero hex digits required of a block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Create a difficulty, rejecting values above [`MAX_DIFFICULTY`].
    pub fn new(zeros: u8) -> Result<Self, CoreError> {
        if zeros > MAX_DIFFICULTY {
            return Err(CoreError::DifficultyTooHigh {
                got: zeros,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(Self(zeros))
    }

    /// Required leading zero hex digits.
    pub const fn zeros(self) -> u8 {
        self.0
    }

    /// Whether `hash` satisfies this difficulty.
    #[inline]
    pub fn is_met_by(self, hash: &BlockHash) -> bool {
        leading_zero_nibbles(hash.as_bytes()) >= u32::from(self.0)
    }

    /// Expected number of hash attempts to find a valid nonce.
    pub fn expected_attempts(self) -> u64 {
        1u64 << (4 * u32::from(self.0))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = CoreError;

    fn try_from(zeros: u8) -> Result<Self, Self::Error> {
        Self::new(zeros)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Count leading zero nibbles (hex digits) of `bytes`.
#[inline]
pub fn leading_zero_nibbles(bytes: &[u8]) -> u32 {
    let mut count = 0;
    for &b in bytes {
        if b == 0 {
            count += 2;
            continue;
        }
        if b < 0x10 {
            count += 1;
        }
        break;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_nibbles() {
        assert_eq!(leading_zero_nibbles(&[0xff, 0x00]), 0);
        assert_eq!(leading_zero_nibbles(&[0x0f, 0x00]), 1);
        assert_eq!(leading_zero_nibbles(&[0x00, 0x10]), 2);
        assert_eq!(leading_zero_nibbles(&[0x00, 0x01]), 3);
        assert_eq!(leading_zero_nibbles(&[0x00; 4]), 8);
    }

    #[test]
    fn test_matches_hex_prefix() {
        let mut bytes = [0xabu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0c;
        let hash = BlockHash::from_bytes(bytes);
        assert!(hash.to_hex().starts_with("000"));
        assert!(!hash.to_hex().starts_with("0000"));

        assert!(Difficulty::new(3).unwrap().is_met_by(&hash));
        assert!(!Difficulty::new(4).unwrap().is_met_by(&hash));
    }

    #[test]
    fn test_zero_difficulty_accepts_anything() {
        let d = Difficulty::new(0).unwrap();
        assert!(d.is_met_by(&BlockHash::from_bytes([0xff; 32])));
        assert_eq!(d.expected_attempts(), 1);
    }

    #[test]
    fn test_bounds() {
        assert!(Difficulty::new(MAX_DIFFICULTY).is_ok());
        assert_eq!(
            Difficulty::new(MAX_DIFFICULTY + 1),
            Err(CoreError::DifficultyTooHigh {
                got: MAX_DIFFICULTY + 1,
                max: MAX_DIFFICULTY
            })
        );
        assert_eq!(Difficulty::default().zeros(), DEFAULT_DIFFICULTY);
    }

    #[test]
    fn test_serde_validates() {
        let d: Difficulty = serde_json::from_str("4").unwrap();
        assert_eq!(d.zeros(), 4);
        assert!(serde_json::from_str::<Difficulty>("9").is_err());
    }
}
