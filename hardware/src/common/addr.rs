//! Physical Address Ranges.

use serde::Serialize;

use super::error::ConfigError;
use super::size::MemorySize;

/// An inclusive range of physical addresses `[first, last]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AddrRange {
    first: u64,
    last: u64,
}

impl AddrRange {
    /// Creates a range covering `first..=last`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` if `first > last`, or for the
    /// whole 64-bit space, whose 2^64 bytes do not fit in a `MemorySize`.
    pub fn new(first: u64, last: u64) -> Result<Self, ConfigError> {
        if first > last || (first == 0 && last == u64::MAX) {
            return Err(ConfigError::InvalidRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// Creates the range of `size` bytes starting at `base`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` for an empty size or a range
    /// running past the end of the address space.
    pub fn with_size(base: u64, size: MemorySize) -> Result<Self, ConfigError> {
        let last = size
            .bytes()
            .checked_sub(1)
            .and_then(|span| base.checked_add(span))
            .ok_or(ConfigError::InvalidRange {
                first: base,
                last: base.wrapping_add(size.bytes()).wrapping_sub(1),
            })?;
        Self::new(base, last)
    }

    /// First address in the range.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Last address in the range (inclusive).
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Number of bytes covered, `last - first + 1`.
    pub fn size(&self) -> MemorySize {
        // `new` rules out the one range whose size overflows.
        MemorySize::from_bytes(self.last - self.first + 1)
    }

    /// Returns `true` if `addr` falls inside the range.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.first && addr <= self.last
    }
}
