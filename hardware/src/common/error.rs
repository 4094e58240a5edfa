//! Assembly Errors.
//!
//! Every stage of building the memory system reports failure through its own
//! error type. `AssemblyError` wraps them so the top-level assembler can
//! propagate any of them with `?`. None of these are retried: all inputs are
//! static configuration.

use thiserror::Error;

use crate::network::topology::TopologyError;
use crate::network::NetworkError;
use crate::protocol::ProtocolError;
use crate::system::memory::MemoryMismatchError;

/// Malformed configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A byte size string that could not be parsed.
    #[error("invalid memory size: {0:?}")]
    InvalidSize(String),

    /// A clock string that could not be parsed.
    #[error("invalid clock: {0:?}")]
    InvalidClock(String),

    /// An address range whose first address is after its last.
    #[error("invalid address range [{first:#x}, {last:#x}]")]
    InvalidRange { first: u64, last: u64 },

    /// A debug verbosity string that is not one of none/low/med/high.
    #[error("invalid debug verbosity: {0:?}")]
    InvalidVerbosity(String),

    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Any failure that aborts building the memory system.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    MemoryMismatch(#[from] MemoryMismatchError),

    /// The protocol factory was not registered or failed to build controllers.
    #[error("upstream protocol factory failed: {0}")]
    UpstreamFactory(#[from] ProtocolError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
