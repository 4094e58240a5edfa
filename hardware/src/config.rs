use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::common::{AddrRange, Clock, ConfigError, MemorySize};
use crate::network::{NetworkError, NetworkKind, NetworkParams, ShapeParams};
use crate::network::{GarnetParams, SimpleParams, TopologyError, TopologyKind};
use crate::protocol::DmaDevice;
use crate::system::debug::DebugDescriptor;

const DEFAULT_PROTOCOL: &str = "MI_example";
const DEFAULT_TOPOLOGY: &str = "crossbar";
const DEFAULT_MESH_ROWS: usize = 1;
const DEFAULT_PHYSMEM_BASE: u64 = 0x0;
const DEFAULT_PHYSMEM_SIZE: MemorySize = MemorySize::mib(512);
const LINK_LATENCY: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ruby: RubyConfig,
    #[serde(default)]
    pub physmem: PhysMemConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub debug: DebugDescriptor,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Load(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            rows: self.ruby.mesh_rows,
            wraparound: self.ruby.wraparound,
            ext_link_latency: self.network.ext_link_latency,
            int_link_latency: self.network.int_link_latency,
        }
    }

    /// One device handle per configured DMA device, named `dma{i}`.
    pub fn dma_devices(&self) -> Vec<DmaDevice> {
        (0..self.ruby.dma_devices)
            .map(|i| DmaDevice::new(format!("dma{}", i)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RubyConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_topology")]
    pub topology: String,

    #[serde(default = "default_mesh_rows")]
    pub mesh_rows: usize,

    #[serde(default)]
    pub wraparound: bool,

    /// `fixed`, `flexible`, or absent for the simple network.
    #[serde(default)]
    pub garnet_network: Option<String>,

    #[serde(default)]
    pub clock: Clock,

    #[serde(default = "default_count")]
    pub num_cpus: usize,

    #[serde(default = "default_count")]
    pub num_dirs: usize,

    #[serde(default)]
    pub dma_devices: usize,
}

impl RubyConfig {
    pub fn topology_kind(&self) -> Result<TopologyKind, TopologyError> {
        self.topology.parse()
    }

    pub fn network_kind(&self) -> Result<NetworkKind, NetworkError> {
        NetworkKind::from_garnet_option(self.garnet_network.as_deref())
    }
}

impl Default for RubyConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            topology: default_topology(),
            mesh_rows: default_mesh_rows(),
            wraparound: false,
            garnet_network: None,
            clock: Clock::default(),
            num_cpus: default_count(),
            num_dirs: default_count(),
            dma_devices: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhysMemConfig {
    #[serde(default = "default_physmem_base")]
    pub base: String,

    #[serde(default = "default_physmem_size")]
    pub size: MemorySize,
}

impl PhysMemConfig {
    pub fn base_val(&self) -> Result<u64, ConfigError> {
        parse_addr(&self.base)
    }

    /// The inclusive physical address range `[base, base + size - 1]`.
    pub fn range(&self) -> Result<AddrRange, ConfigError> {
        AddrRange::with_size(self.base_val()?, self.size)
    }
}

impl Default for PhysMemConfig {
    fn default() -> Self {
        Self {
            base: default_physmem_base(),
            size: default_physmem_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_link_latency")]
    pub ext_link_latency: u32,

    #[serde(default = "default_link_latency")]
    pub int_link_latency: u32,

    #[serde(default)]
    pub simple: SimpleParams,

    #[serde(default)]
    pub garnet: GarnetParams,
}

impl NetworkConfig {
    pub fn params(&self) -> NetworkParams {
        NetworkParams {
            simple: self.simple,
            garnet: self.garnet,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ext_link_latency: LINK_LATENCY,
            int_link_latency: LINK_LATENCY,
            simple: SimpleParams::default(),
            garnet: GarnetParams::default(),
        }
    }
}

/// Parses a hexadecimal (`0x`-prefixed) or decimal address.
fn parse_addr(s: &str) -> Result<u64, ConfigError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| ConfigError::Load(format!("invalid address {:?}", s)))
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

fn default_topology() -> String {
    DEFAULT_TOPOLOGY.to_string()
}

fn default_mesh_rows() -> usize {
    DEFAULT_MESH_ROWS
}

fn default_count() -> usize {
    1
}

fn default_physmem_base() -> String {
    format!("{:#x}", DEFAULT_PHYSMEM_BASE)
}

fn default_physmem_size() -> MemorySize {
    DEFAULT_PHYSMEM_SIZE
}

fn default_link_latency() -> u32 {
    LINK_LATENCY
}
