//! Garnet Network Models.
//!
//! Detailed timing: every topology router becomes a router model with its
//! own ports, virtual channels and pipeline, and every topology link a link
//! model with its own latency and flit width. The fixed variant always uses
//! the static four-stage router pipeline; the flexible variant takes the
//! depth from its parameters.

use serde::{Deserialize, Serialize};

use super::topology::{NodeId, Topology};
use super::NetworkError;

/// Pipeline depth of the fixed-configuration router.
pub const FIXED_PIPELINE_STAGES: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GarnetVariant {
    Fixed,
    Flexible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GarnetParams {
    /// Flit width in bytes.
    #[serde(default = "d_g_flit")]
    pub flit_size: u32,
    /// Virtual channels per port for each of the data and control classes.
    #[serde(default = "d_g_vcs")]
    pub vcs_per_class: u32,
    #[serde(default = "d_g_data")]
    pub buffers_per_data_vc: u32,
    #[serde(default = "d_g_ctrl")]
    pub buffers_per_ctrl_vc: u32,
    /// Router pipeline depth; ignored by the fixed variant.
    #[serde(default = "d_g_pipe")]
    pub number_of_pipe_stages: u32,
}

fn d_g_flit() -> u32 {
    16
}

fn d_g_vcs() -> u32 {
    4
}

fn d_g_data() -> u32 {
    4
}

fn d_g_ctrl() -> u32 {
    1
}

fn d_g_pipe() -> u32 {
    FIXED_PIPELINE_STAGES
}

impl Default for GarnetParams {
    fn default() -> Self {
        Self {
            flit_size: d_g_flit(),
            vcs_per_class: d_g_vcs(),
            buffers_per_data_vc: d_g_data(),
            buffers_per_ctrl_vc: d_g_ctrl(),
            number_of_pipe_stages: d_g_pipe(),
        }
    }
}

/// Timing state of one router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouterModel {
    pub node: NodeId,
    /// One port per incident link.
    pub ports: usize,
    pub pipe_stages: u32,
    pub vcs_per_class: u32,
    /// Flit buffer slots across all ports, data and control VCs alike.
    pub buffer_slots: u64,
}

/// `ports * vcs_per_class * (buffers_per_data_vc + buffers_per_ctrl_vc)`,
/// or `None` if it overflows.
fn buffer_slots(params: &GarnetParams, ports: usize) -> Option<u64> {
    let per_vc_pair = u64::from(params.buffers_per_data_vc) + u64::from(params.buffers_per_ctrl_vc);
    u64::from(params.vcs_per_class)
        .checked_mul(per_vc_pair)?
        .checked_mul(u64::try_from(ports).ok()?)
}

/// Timing state of one link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LinkModel {
    pub a: NodeId,
    pub b: NodeId,
    pub latency: u32,
    pub flit_size: u32,
}

#[derive(Debug)]
pub struct GarnetNetwork {
    variant: GarnetVariant,
    params: GarnetParams,
    routers: Vec<RouterModel>,
    links: Vec<LinkModel>,
}

impl GarnetNetwork {
    /// Builds router and link models for every router and link of
    /// `topology`.
    ///
    /// # Errors
    ///
    /// `NetworkError::BufferOverflow` if a router's buffer count does not
    /// fit in a `u64`.
    pub fn new(
        topology: &Topology,
        variant: GarnetVariant,
        params: GarnetParams,
    ) -> Result<Self, NetworkError> {
        let pipe_stages = match variant {
            GarnetVariant::Fixed => FIXED_PIPELINE_STAGES,
            GarnetVariant::Flexible => params.number_of_pipe_stages,
        };

        let routers = topology
            .routers()
            .map(|r| {
                let ports = topology.links_of(r.id).count();
                let buffer_slots = buffer_slots(&params, ports)
                    .ok_or(NetworkError::BufferOverflow { router: r.id.0 })?;
                tracing::debug!(router = r.id.0, ports, pipe_stages, buffer_slots, "garnet router");
                Ok(RouterModel {
                    node: r.id,
                    ports,
                    pipe_stages,
                    vcs_per_class: params.vcs_per_class,
                    buffer_slots,
                })
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;

        let links = topology
            .links()
            .iter()
            .map(|l| LinkModel {
                a: l.a,
                b: l.b,
                latency: l.latency,
                flit_size: params.flit_size,
            })
            .collect();

        Ok(Self {
            variant,
            params,
            routers,
            links,
        })
    }

    pub fn variant(&self) -> GarnetVariant {
        self.variant
    }

    pub fn params(&self) -> &GarnetParams {
        &self.params
    }

    pub fn routers(&self) -> &[RouterModel] {
        &self.routers
    }

    pub fn links(&self) -> &[LinkModel] {
        &self.links
    }

    /// Latency of a single flit from `from` to `to` with no contention:
    /// link latencies plus the pipeline depth of every router traversed.
    pub fn zero_load_latency(&self, topology: &Topology, from: NodeId, to: NodeId) -> Option<u64> {
        let is_endpoint = |id: NodeId| topology.node(id).is_some_and(|n| n.is_endpoint());
        if !is_endpoint(from) || !is_endpoint(to) {
            return None;
        }
        let stages = |node: NodeId| {
            self.routers
                .iter()
                .find(|r| r.node == node)
                .map_or(0, |r| u64::from(r.pipe_stages))
        };
        let dist = topology.shortest_paths(from, |n| stages(n.id), |l| u64::from(l.latency));
        dist[to.0]
    }
}
