//! Memory-system assembly.
//!
//! Combines the controllers of a coherence protocol, an interconnect
//! topology and a network model into a single validated [`RubySystem`].

pub mod builder;
pub mod debug;
pub mod memory;
pub mod tracer;

pub use builder::{assemble, assemble_with, create_system, AssemblyOptions, RubySystem};
pub use debug::{DebugDescriptor, Verbosity};
pub use memory::{validate, MemoryMismatchError};
pub use tracer::Tracer;
