//! Memory System Builder.
//!
//! This module defines the `RubySystem` structure, the container for the
//! network, controllers and instrumentation of the simulated memory system.
//! It handles building and wiring the system from a controller set and the
//! topology/network selectors, and refuses to produce a system whose
//! directories do not cover physical memory exactly.

use serde::Serialize;
use std::sync::Arc;

use super::debug::DebugDescriptor;
use super::memory;
use super::tracer::Tracer;
use crate::common::{AddrRange, AssemblyError, Clock, MemorySize};
use crate::config::Config;
use crate::network::{self, topology, Network, NetworkKind, NetworkParams};
use crate::network::{ShapeParams, TopologyKind};
use crate::protocol::{Controller, ControllerSet, DmaDevice, ProtocolRegistry};
use crate::stats::Profiler;

/// Optional tunables for assembly beyond the required selectors.
#[derive(Clone, Debug, Default)]
pub struct AssemblyOptions {
    pub network: NetworkParams,
    pub debug: DebugDescriptor,
}

/// The assembled memory system.
///
/// Built exactly once per run and read-only afterwards.
#[derive(Debug)]
pub struct RubySystem {
    clock: Clock,
    network: Network,
    profiler: Profiler,
    tracer: Tracer,
    debug: DebugDescriptor,
    mem_size: MemorySize,
    ports: Vec<Controller>,
    controllers: ControllerSet,
}

/// Serializable overview of an assembled system.
#[derive(Clone, Debug, Serialize)]
pub struct SystemSummary {
    pub clock: String,
    pub topology: TopologyKind,
    pub network: NetworkKind,
    pub nodes: usize,
    pub routers: usize,
    pub links: usize,
    pub mem_size: MemorySize,
    pub ports: Vec<String>,
    pub controllers: usize,
    pub debug: DebugDescriptor,
}

/// Builds a memory system with default network parameters and the default
/// debug descriptor.
///
/// See [`assemble_with`].
pub fn assemble(
    controllers: ControllerSet,
    topology_kind: TopologyKind,
    network_kind: NetworkKind,
    shape: &ShapeParams,
    physmem: &AddrRange,
    clock: Clock,
) -> Result<RubySystem, AssemblyError> {
    assemble_with(
        controllers,
        topology_kind,
        network_kind,
        shape,
        physmem,
        clock,
        &AssemblyOptions::default(),
    )
}

/// Builds a memory system.
///
/// The topology is built before the network, since the network models size
/// themselves from it. Directory memory is then validated against
/// `physmem`; any failure aborts without producing a system.
///
/// # Errors
///
/// Topology, memory-mismatch and debug-verbosity failures, as
/// `AssemblyError`.
pub fn assemble_with(
    controllers: ControllerSet,
    topology_kind: TopologyKind,
    network_kind: NetworkKind,
    shape: &ShapeParams,
    physmem: &AddrRange,
    clock: Clock,
    options: &AssemblyOptions,
) -> Result<RubySystem, AssemblyError> {
    let topology = Arc::new(topology::build(topology_kind, &controllers, shape)?);
    let network = network::create_with(network_kind, topology, &options.network)?;

    let mem_size = memory::validate(&controllers, physmem)?;

    let profiler = Profiler::new(controllers.sequencer_count());

    options.debug.verbosity()?;
    let debug = options.debug.clone();
    let tracer = Tracer::new(debug.protocol_trace);

    let ports: Vec<Controller> = controllers.sequencers().cloned().collect();

    tracing::info!(
        clock = %clock,
        network = %network_kind,
        mem_size = %mem_size,
        ports = ports.len(),
        "ruby system assembled"
    );

    Ok(RubySystem {
        clock,
        network,
        profiler,
        tracer,
        debug,
        mem_size,
        ports,
        controllers,
    })
}

/// Builds the memory system described by `config`.
///
/// Resolves the topology and network selectors, runs the configured
/// protocol's factory from `registry`, and assembles the result.
pub fn create_system(
    config: &Config,
    registry: &ProtocolRegistry,
    dma_devices: &[DmaDevice],
) -> Result<RubySystem, AssemblyError> {
    let topology_kind = config.ruby.topology_kind()?;
    let network_kind = config.ruby.network_kind()?;
    let physmem = config.physmem.range()?;

    let controllers =
        registry.create_system(&config.ruby.protocol, &config.ruby, &physmem, dma_devices)?;

    let options = AssemblyOptions {
        network: config.network.params(),
        debug: config.debug.clone(),
    };

    assemble_with(
        controllers,
        topology_kind,
        network_kind,
        &config.shape_params(),
        &physmem,
        config.ruby.clock,
        &options,
    )
}

impl RubySystem {
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn debug(&self) -> &DebugDescriptor {
        &self.debug
    }

    /// Total directory-backed memory, equal to the physical memory size.
    pub fn mem_size(&self) -> MemorySize {
        self.mem_size
    }

    /// The sequencers, where external request sources attach.
    pub fn ports(&self) -> &[Controller] {
        &self.ports
    }

    /// Every controller in the system.
    pub fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    /// The directory controller owning physical address `addr`.
    pub fn directory_for(&self, addr: u64) -> Option<&Controller> {
        self.controllers
            .directories()
            .find(|d| d.memory_range().is_some_and(|r| r.contains(addr)))
    }

    pub fn summary(&self) -> SystemSummary {
        let topology = self.network.topology();
        SystemSummary {
            clock: self.clock.to_string(),
            topology: topology.kind(),
            network: self.network.kind(),
            nodes: topology.node_count(),
            routers: topology.router_count(),
            links: topology.link_count(),
            mem_size: self.mem_size,
            ports: self.ports.iter().map(|p| p.name().to_string()).collect(),
            controllers: self.controllers.len(),
            debug: self.debug.clone(),
        }
    }
}
