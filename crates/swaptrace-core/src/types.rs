//! Core type definitions for swaptrace

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Token quantity in base units.
///
/// Every multiplication on an `Amount` goes through the checked operators;
/// overflow is an error, never a wrap.
pub type Amount = u128;

/// Block timestamp (seconds)
pub type Timestamp = u64;

/// Account or contract address (20 bytes).
///
/// Ordering is bytewise, which matches numeric ordering of the address.
/// Rendered as lowercase `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a hex address, with or without the `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits).map_err(|e| Error::InvalidAddress {
            address: s.to_string(),
            reason: e.to_string(),
        })?;

        let bytes: [u8; 20] = bytes.try_into().map_err(|v: Vec<u8>| Error::InvalidAddress {
            address: s.to_string(),
            reason: format!("expected 20 bytes, got {}", v.len()),
        })?;

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Serde helpers rendering an [`Amount`] as a decimal string.
///
/// JSON numbers cannot carry the full 128-bit range portably, so amounts go
/// over the wire the way ABI decoders render uints: `"69000000000000000000"`.
/// Deserialization also accepts plain JSON integers.
pub mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Amount;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(n as Amount),
        }
    }
}

/// Constants
pub mod constants {
    /// Basis points in one whole (100%)
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// Default platform label written into trade records
    pub const DEFAULT_PLATFORM: &str = "uniswap-v2";
}
