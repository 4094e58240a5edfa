//! Simple Network.
//!
//! Approximates the interconnect as a fully connected set of endpoints.
//! At construction the minimum link latency between every pair of
//! endpoints is computed once; routers contribute no delay of their own.

use serde::{Deserialize, Serialize};

use super::topology::{NodeId, Topology};

const DEFAULT_ENDPOINT_BANDWIDTH: u32 = 10000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimpleParams {
    /// Bandwidth at each endpoint, in units of 1/1000 bytes per cycle.
    #[serde(default = "default_endpoint_bandwidth")]
    pub endpoint_bandwidth: u32,
    /// Message buffer depth; 0 means unbounded.
    #[serde(default)]
    pub buffer_size: u32,
}

fn default_endpoint_bandwidth() -> u32 {
    DEFAULT_ENDPOINT_BANDWIDTH
}

impl Default for SimpleParams {
    fn default() -> Self {
        Self {
            endpoint_bandwidth: DEFAULT_ENDPOINT_BANDWIDTH,
            buffer_size: 0,
        }
    }
}

/// Latency-only network model.
#[derive(Debug)]
pub struct SimpleNetwork {
    params: SimpleParams,
    endpoints: Vec<NodeId>,
    /// `latencies[i][j]` for the `i`-th and `j`-th endpoints.
    latencies: Vec<Vec<Option<u64>>>,
}

impl SimpleNetwork {
    pub fn new(topology: &Topology, params: SimpleParams) -> Self {
        let endpoints: Vec<NodeId> = topology.endpoints().map(|n| n.id).collect();
        let latencies: Vec<Vec<Option<u64>>> = endpoints
            .iter()
            .map(|&src| {
                let dist = topology.shortest_paths(src, |_| 0, |l| u64::from(l.latency));
                endpoints.iter().map(|dst| dist[dst.0]).collect::<Vec<_>>()
            })
            .collect();

        Self {
            params,
            endpoints,
            latencies,
        }
    }

    pub fn params(&self) -> &SimpleParams {
        &self.params
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Point-to-point latency between two endpoint nodes.
    pub fn latency(&self, from: NodeId, to: NodeId) -> Option<u64> {
        let i = self.endpoints.iter().position(|&n| n == from)?;
        let j = self.endpoints.iter().position(|&n| n == to)?;
        self.latencies[i][j]
    }
}
