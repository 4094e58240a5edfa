//! Interconnect Network Models.
//!
//! This module selects and constructs the network model that carries
//! coherence traffic over a topology. Three models are available:
//!
//! * **Simple**: latency-only point-to-point approximation. Router-level
//!   structure is folded into an endpoint-to-endpoint latency table.
//! * **Fixed Garnet**: detailed router/link timing with a static router
//!   pipeline.
//! * **Flexible Garnet**: detailed router/link timing with a configurable
//!   router pipeline depth.
//!
//! The topology must be complete before a network is created: the models
//! size their router and link state from it at construction time.

pub mod garnet;
pub mod simple;
pub mod topology;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub use garnet::{GarnetNetwork, GarnetParams, GarnetVariant, LinkModel, RouterModel};
pub use simple::{SimpleNetwork, SimpleParams};
pub use topology::{NodeId, ShapeParams, Topology, TopologyError, TopologyKind};

/// Failures while selecting or sizing a network model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("unsupported network kind {0:?} (expected simple, fixed or flexible)")]
    UnsupportedNetworkKind(String),
    #[error("garnet router {router} has more buffer slots than fit in 64 bits")]
    BufferOverflow { router: usize },
}

/// Network model selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkKind {
    Simple,
    FixedGarnet,
    FlexibleGarnet,
}

impl NetworkKind {
    /// Maps the `garnet_network` option onto a network kind.
    ///
    /// An absent option selects the simple network.
    pub fn from_garnet_option(option: Option<&str>) -> Result<Self, NetworkError> {
        match option {
            None => Ok(NetworkKind::Simple),
            Some(s) => s.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::Simple => "simple",
            NetworkKind::FixedGarnet => "fixed-garnet",
            NetworkKind::FlexibleGarnet => "flexible-garnet",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" | "simple" => Ok(NetworkKind::Simple),
            "fixed" | "fixed-garnet" => Ok(NetworkKind::FixedGarnet),
            "flexible" | "flexible-garnet" => Ok(NetworkKind::FlexibleGarnet),
            other => Err(NetworkError::UnsupportedNetworkKind(other.to_string())),
        }
    }
}

/// Tunables for every network model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkParams {
    #[serde(default)]
    pub simple: SimpleParams,
    #[serde(default)]
    pub garnet: GarnetParams,
}

enum TimingModel {
    Simple(SimpleNetwork),
    Garnet(GarnetNetwork),
}

/// A network model bound to its topology.
pub struct Network {
    kind: NetworkKind,
    topology: Arc<Topology>,
    model: TimingModel,
}

/// Creates a network of `kind` with default parameters.
pub fn create(kind: NetworkKind, topology: Arc<Topology>) -> Result<Network, NetworkError> {
    create_with(kind, topology, &NetworkParams::default())
}

/// Creates a network of `kind` over `topology`.
///
/// Each call builds fresh model state; nothing is shared between two
/// networks created from the same topology except the topology itself.
///
/// # Errors
///
/// `NetworkError::BufferOverflow` if the Garnet parameters size a router
/// beyond a 64-bit buffer count.
pub fn create_with(
    kind: NetworkKind,
    topology: Arc<Topology>,
    params: &NetworkParams,
) -> Result<Network, NetworkError> {
    let model = match kind {
        NetworkKind::Simple => TimingModel::Simple(SimpleNetwork::new(&topology, params.simple)),
        NetworkKind::FixedGarnet => {
            TimingModel::Garnet(GarnetNetwork::new(&topology, GarnetVariant::Fixed, params.garnet)?)
        }
        NetworkKind::FlexibleGarnet => TimingModel::Garnet(GarnetNetwork::new(
            &topology,
            GarnetVariant::Flexible,
            params.garnet,
        )?),
    };

    tracing::info!(
        kind = %kind,
        nodes = topology.node_count(),
        links = topology.link_count(),
        "network created"
    );

    Ok(Network {
        kind,
        topology,
        model,
    })
}

impl Network {
    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.topology.link_count()
    }

    /// Router models; empty for the simple network.
    pub fn routers(&self) -> &[RouterModel] {
        match &self.model {
            TimingModel::Simple(_) => &[],
            TimingModel::Garnet(g) => g.routers(),
        }
    }

    /// Link models; empty for the simple network.
    pub fn link_models(&self) -> &[LinkModel] {
        match &self.model {
            TimingModel::Simple(_) => &[],
            TimingModel::Garnet(g) => g.links(),
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleNetwork> {
        match &self.model {
            TimingModel::Simple(s) => Some(s),
            TimingModel::Garnet(_) => None,
        }
    }

    pub fn as_garnet(&self) -> Option<&GarnetNetwork> {
        match &self.model {
            TimingModel::Simple(_) => None,
            TimingModel::Garnet(g) => Some(g),
        }
    }

    /// Zero-load latency in cycles between two endpoint nodes.
    ///
    /// Returns `None` if either node is not an endpoint or no path exists.
    pub fn latency(&self, from: NodeId, to: NodeId) -> Option<u64> {
        match &self.model {
            TimingModel::Simple(s) => s.latency(from, to),
            TimingModel::Garnet(g) => g.zero_load_latency(&self.topology, from, to),
        }
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("kind", &self.kind)
            .field("nodes", &self.node_count())
            .field("links", &self.link_count())
            .field("routers", &self.routers().len())
            .finish()
    }
}
