//! Directory Memory Validation.
//!
//! The directories must together own exactly as much memory as the
//! simulated machine has. Address-to-directory routing depends on it, so a
//! mismatch is fatal to assembly.

use serde::Serialize;
use thiserror::Error;

use crate::common::{AddrRange, MemorySize};
use crate::protocol::ControllerSet;

/// The directories do not cover physical memory exactly.
///
/// Both sides are byte counts. The directory total is a sum of ranges and
/// can exceed the 64-bit address space when directories overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error(
    "directory memory mismatch: physical memory is {} but directories total {}",
    show_bytes(.expected),
    show_bytes(.actual)
)]
pub struct MemoryMismatchError {
    /// Size of the physical memory range.
    pub expected: u128,
    /// Sum of the directory sizes.
    pub actual: u128,
}

fn show_bytes(bytes: &u128) -> String {
    match u64::try_from(*bytes) {
        Ok(b) => MemorySize::from_bytes(b).to_string(),
        Err(_) => format!("{}B", bytes),
    }
}

/// Sums the bytes owned by every directory controller.
///
/// Counted in `u128`, which holds the sum of any number of 64-bit ranges a
/// `ControllerSet` can hold.
pub fn total_directory_size(controllers: &ControllerSet) -> u128 {
    controllers
        .directories()
        .filter_map(|d| d.directory_size())
        .map(|size| u128::from(size.bytes()))
        .sum()
}

/// Checks that the directories together own exactly `physmem`.
///
/// # Returns
///
/// The validated total memory size, equal to `physmem.size()`.
///
/// # Errors
///
/// `MemoryMismatchError` if the directory total differs from the physical
/// range size by any amount.
pub fn validate(
    controllers: &ControllerSet,
    physmem: &AddrRange,
) -> Result<MemorySize, MemoryMismatchError> {
    let size = physmem.size();
    let expected = u128::from(size.bytes());
    let actual = total_directory_size(controllers);

    if actual != expected {
        return Err(MemoryMismatchError { expected, actual });
    }

    tracing::debug!(
        directories = controllers.directory_count(),
        total = %size,
        "directory memory matches physical memory"
    );
    Ok(size)
}
