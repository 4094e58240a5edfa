//! Common utilities and types used throughout the memory-system builder.
//!
//! This module provides the small value types (byte sizes, address ranges,
//! clock rates) and the error taxonomy shared by the topology, network,
//! protocol and system modules.

/// Inclusive physical address ranges.
pub mod addr;

/// Clock-rate parsing.
pub mod clock;

/// Error types for every assembly stage.
pub mod error;

/// Byte sizes with unit-suffixed parsing.
pub mod size;

pub use addr::AddrRange;
pub use clock::Clock;
pub use error::{AssemblyError, ConfigError};
pub use size::MemorySize;
