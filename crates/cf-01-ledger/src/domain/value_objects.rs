//! # Value Objects
//!
//! Immutable domain primitives for the crowdfund ledger.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export U256 from primitive-types for 256-bit amounts
pub use primitive_types::U256;

// =============================================================================
// IDENTITY (20 bytes)
// =============================================================================

/// An opaque 20-byte account identity.
///
/// Used for externally owned accounts and contract-like callers alike.
/// It carries no ownership semantics: it is a map key and an equality token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity(pub [u8; 20]);

impl Identity {
    /// The zero identity (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an identity from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives a deterministic identity from a human-readable label.
    ///
    /// The identity is the last 20 bytes of `keccak256(label)`, so the same
    /// label always names the same account.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let digest = Keccak256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    /// Creates an identity from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(slice);
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full `0x`-prefixed lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error parsing an [`Identity`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdentityError {
    /// Not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Decoded to the wrong number of bytes.
    #[error("invalid length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|e| ParseIdentityError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).ok_or(ParseIdentityError::InvalidLength(bytes.len()))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl From<[u8; 20]> for Identity {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Identity> for [u8; 20] {
    fn from(id: Identity) -> Self {
        id.0
    }
}

// =============================================================================
// UNITS
// =============================================================================

/// Ether denominated helpers. All amounts are held in wei.
pub mod units {
    use super::U256;
    use thiserror::Error;

    /// Decimal places between wei and ether.
    pub const ETHER_DECIMALS: usize = 18;

    /// 10^18 wei.
    #[must_use]
    pub fn wei_per_ether() -> U256 {
        U256::exp10(ETHER_DECIMALS)
    }

    /// Whole ether to wei.
    #[must_use]
    pub fn ether(amount: u64) -> U256 {
        U256::from(amount) * wei_per_ether()
    }

    /// Thousandths of an ether to wei (`milli_ether(100)` is 0.1 ether).
    #[must_use]
    pub fn milli_ether(amount: u64) -> U256 {
        U256::from(amount) * U256::exp10(ETHER_DECIMALS - 3)
    }

    /// Error parsing a decimal ether amount.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ParseAmountError {
        /// Empty input.
        #[error("empty amount")]
        Empty,
        /// Contains something other than digits and a single dot.
        #[error("invalid amount: {0}")]
        Invalid(String),
        /// More than 18 fractional digits.
        #[error("too many decimal places: {0} > 18")]
        TooPrecise(usize),
        /// Does not fit in 256 bits.
        #[error("amount overflows 256 bits")]
        Overflow,
    }

    /// Parses a decimal ether string such as `"0.1"` or `"5"` into wei.
    pub fn parse_ether(text: &str) -> Result<U256, ParseAmountError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseAmountError::Empty);
        }
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty())
        {
            return Err(ParseAmountError::Invalid(text.to_string()));
        }
        if fraction.len() > ETHER_DECIMALS {
            return Err(ParseAmountError::TooPrecise(fraction.len()));
        }

        let whole = if whole.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(whole).map_err(|_| ParseAmountError::Overflow)?
        };
        let padded = format!("{fraction:0<width$}", width = ETHER_DECIMALS);
        let fraction = U256::from_dec_str(&padded).map_err(|_| ParseAmountError::Overflow)?;

        whole
            .checked_mul(wei_per_ether())
            .and_then(|w| w.checked_add(fraction))
            .ok_or(ParseAmountError::Overflow)
    }

    /// Renders wei as a decimal ether string, trimming trailing zeros.
    #[must_use]
    pub fn format_ether(amount: U256) -> String {
        let (whole, fraction) = amount.div_mod(wei_per_ether());
        if fraction.is_zero() {
            return whole.to_string();
        }
        let digits = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

// =============================================================================
// TESTS
// =============================================================================
