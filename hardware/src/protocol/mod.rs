//! Coherence Protocol Controllers.
//!
//! A coherence protocol contributes the controllers that populate the
//! memory system: sequencers (the request entry points of each CPU),
//! directory controllers (each owning a slice of physical memory) and DMA
//! controllers. This module defines those controllers, the factory
//! interface protocols implement, and the registry that maps protocol
//! names to factories.

pub mod mi_example;

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::common::{AddrRange, MemorySize};
use crate::config::RubyConfig;

pub use mi_example::MiExample;

/// The part a controller plays in the memory system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerRole {
    /// A compute node's memory-request entry point.
    Sequencer,
    /// Owner of a range of physical memory and its coherence state.
    DirectoryController,
    /// Request entry point for a DMA-capable device.
    DmaController,
}

/// A single coherence controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Controller {
    name: String,
    role: ControllerRole,
    version: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<AddrRange>,
}

impl Controller {
    /// Creates the `version`-th sequencer, named `l1_cntrl{version}`.
    pub fn sequencer(version: usize) -> Self {
        Self {
            name: format!("l1_cntrl{}", version),
            role: ControllerRole::Sequencer,
            version,
            memory: None,
        }
    }

    /// Creates the `version`-th directory controller owning `range`.
    pub fn directory(version: usize, range: AddrRange) -> Self {
        Self {
            name: format!("dir_cntrl{}", version),
            role: ControllerRole::DirectoryController,
            version,
            memory: Some(range),
        }
    }

    /// Creates the `version`-th DMA controller.
    pub fn dma(version: usize) -> Self {
        Self {
            name: format!("dma_cntrl{}", version),
            role: ControllerRole::DmaController,
            version,
            memory: None,
        }
    }

    /// Replaces the generated name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ControllerRole {
        self.role
    }

    /// Index of this controller among controllers of the same role.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Address range owned by a directory controller.
    pub fn memory_range(&self) -> Option<&AddrRange> {
        self.memory.as_ref()
    }

    /// Size of the memory owned by a directory controller, if any.
    pub fn directory_size(&self) -> Option<MemorySize> {
        self.memory.map(|r| r.size())
    }

    pub fn is_sequencer(&self) -> bool {
        self.role == ControllerRole::Sequencer
    }

    pub fn is_directory(&self) -> bool {
        self.role == ControllerRole::DirectoryController
    }

    pub fn is_dma(&self) -> bool {
        self.role == ControllerRole::DmaController
    }
}

/// The ordered list of controllers produced by a protocol factory.
///
/// Order is significant: topology builders place endpoints in this order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ControllerSet {
    all: Vec<Controller>,
}

impl ControllerSet {
    pub fn new(all: Vec<Controller>) -> Self {
        Self { all }
    }

    /// Every controller in factory order.
    pub fn all(&self) -> &[Controller] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn sequencers(&self) -> impl Iterator<Item = &Controller> {
        self.all.iter().filter(|c| c.is_sequencer())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Controller> {
        self.all.iter().filter(|c| c.is_directory())
    }

    pub fn dma_controllers(&self) -> impl Iterator<Item = &Controller> {
        self.all.iter().filter(|c| c.is_dma())
    }

    pub fn sequencer_count(&self) -> usize {
        self.sequencers().count()
    }

    pub fn directory_count(&self) -> usize {
        self.directories().count()
    }
}

impl FromIterator<Controller> for ControllerSet {
    fn from_iter<I: IntoIterator<Item = Controller>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Handle to a DMA-capable device that needs its own controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmaDevice {
    pub name: String,
}

impl DmaDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Failures reported by the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// No factory is registered under the requested name.
    #[error("could not create system for ruby protocol {0}: protocol not registered")]
    UnknownProtocol(String),

    /// The factory rejected the options it was given.
    #[error("could not create system for ruby protocol {protocol}: {reason}")]
    Factory { protocol: String, reason: String },
}

/// Builds the controllers for one coherence protocol.
pub trait ProtocolFactory {
    /// Name the protocol is registered under.
    fn name(&self) -> &str;

    /// Creates every controller of the protocol for the given machine.
    ///
    /// # Arguments
    ///
    /// * `options` - Protocol sizing options (CPU and directory counts)
    /// * `physmem` - Physical memory the directories must cover
    /// * `dma_devices` - Devices that each need a DMA controller
    fn create_system(
        &self,
        options: &RubyConfig,
        physmem: &AddrRange,
        dma_devices: &[DmaDevice],
    ) -> Result<ControllerSet, ProtocolError>;
}

/// Explicit mapping from protocol name to factory.
#[derive(Default)]
pub struct ProtocolRegistry {
    factories: BTreeMap<String, Box<dyn ProtocolFactory>>,
}

impl ProtocolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every protocol shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MiExample));
        registry
    }

    /// Registers a factory under its own name, replacing any previous one.
    pub fn register(&mut self, factory: Box<dyn ProtocolFactory>) {
        tracing::debug!(protocol = factory.name(), "registered coherence protocol");
        self.factories.insert(factory.name().to_string(), factory);
    }

    pub fn get(&self, protocol: &str) -> Option<&dyn ProtocolFactory> {
        self.factories.get(protocol).map(|f| f.as_ref())
    }

    /// Registered protocol names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Looks up `protocol` and runs its factory.
    ///
    /// # Errors
    ///
    /// `ProtocolError::UnknownProtocol` if nothing is registered under the
    /// name, or whatever the factory itself reports.
    pub fn create_system(
        &self,
        protocol: &str,
        options: &RubyConfig,
        physmem: &AddrRange,
        dma_devices: &[DmaDevice],
    ) -> Result<ControllerSet, ProtocolError> {
        let factory = self
            .get(protocol)
            .ok_or_else(|| ProtocolError::UnknownProtocol(protocol.to_string()))?;
        factory.create_system(options, physmem, dma_devices)
    }
}
