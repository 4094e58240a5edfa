//! Ruby Memory System Builder.
//!
//! This crate assembles the cache-coherent memory subsystem of a hardware
//! simulator. Given the controllers produced by a coherence protocol, it
//! builds an interconnect topology, instantiates a network model over it,
//! checks that the directories cover physical memory exactly, and wires the
//! result together with profiling, tracing and debug instrumentation.
//!
//! # Architecture
//!
//! * **Protocol**: factories registered by name produce sequencers,
//!   directory controllers and DMA controllers.
//! * **Topology**: crossbar, mesh, or mesh with directories at the corners.
//! * **Network**: simple latency-only model, or fixed/flexible Garnet.
//! * **System**: the validated, read-only `RubySystem`.
//!
//! # Modules
//!
//! * `common`: Sizes, address ranges, clocks, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `network`: Topologies and network timing models.
//! * `protocol`: Controllers and the protocol registry.
//! * `stats`: Memory-system profiler.
//! * `system`: Memory validation and system assembly.

/// Shared value types and the assembly error taxonomy.
pub mod common;

/// Configuration system for the protocol, topology, network and memory map.
///
/// Loads and parses TOML configuration files.
pub mod config;

/// Interconnect topologies and the network models built over them.
pub mod network;

/// Coherence controllers, protocol factories and the protocol registry.
pub mod protocol;

/// Per-sequencer request statistics.
pub mod stats;

/// Memory validation, instrumentation handles, and the system assembler.
pub mod system;

pub use common::{AddrRange, AssemblyError, Clock, MemorySize};
pub use system::{assemble, RubySystem};
