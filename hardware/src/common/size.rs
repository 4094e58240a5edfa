//! Memory Sizes.
//!
//! Directories and physical memory declare their capacity as a byte count.
//! Configuration files spell these with unit suffixes (`"256MB"`, `"1GiB"`),
//! always interpreted as binary multiples.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;

/// A non-negative number of bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemorySize(u64);

impl MemorySize {
    /// The empty size, `0B`.
    pub const ZERO: MemorySize = MemorySize(0);

    /// Creates a size from a raw byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Creates a size of `n` kibibytes.
    ///
    /// # Panics
    ///
    /// Panics if the byte count overflows a `u64`. Sizes read from
    /// configuration go through `FromStr`, which reports overflow instead.
    pub const fn kib(n: u64) -> Self {
        Self::scaled(n, KIB)
    }

    /// Creates a size of `n` mebibytes.
    ///
    /// # Panics
    ///
    /// Panics if the byte count overflows a `u64`. Sizes read from
    /// configuration go through `FromStr`, which reports overflow instead.
    pub const fn mib(n: u64) -> Self {
        Self::scaled(n, MIB)
    }

    /// Creates a size of `n` gibibytes.
    ///
    /// # Panics
    ///
    /// Panics if the byte count overflows a `u64`. Sizes read from
    /// configuration go through `FromStr`, which reports overflow instead.
    pub const fn gib(n: u64) -> Self {
        Self::scaled(n, GIB)
    }

    const fn scaled(n: u64, unit: u64) -> Self {
        match n.checked_mul(unit) {
            Some(bytes) => Self(bytes),
            None => panic!("memory size overflows u64"),
        }
    }

    /// Returns the raw byte count.
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Adds two sizes, returning `None` on overflow.
    pub fn checked_add(self, rhs: MemorySize) -> Option<MemorySize> {
        self.0.checked_add(rhs.0).map(MemorySize)
    }
}

impl From<u64> for MemorySize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MemorySize {
    /// Prints the largest binary unit that divides the size exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b == 0 {
            return write!(f, "0B");
        }
        for (unit, name) in [(TIB, "TiB"), (GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")] {
            if b % unit == 0 {
                return write!(f, "{}{}", b / unit, name);
            }
        }
        write!(f, "{}B", b)
    }
}

impl FromStr for MemorySize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ConfigError::InvalidSize(s.to_string());

        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16)
                .map(MemorySize)
                .map_err(|_| invalid());
        }

        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, suffix) = text.split_at(split);
        let value: u64 = digits.parse().map_err(|_| invalid())?;

        let multiplier = match suffix.trim() {
            "" | "B" => 1,
            "k" | "kB" | "KB" | "KiB" => KIB,
            "M" | "MB" | "MiB" => MIB,
            "G" | "GB" | "GiB" => GIB,
            "T" | "TB" | "TiB" => TIB,
            _ => return Err(invalid()),
        };

        value
            .checked_mul(multiplier)
            .map(MemorySize)
            .ok_or_else(invalid)
    }
}

impl Serialize for MemorySize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MemorySize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(b) => Ok(MemorySize(b)),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}
