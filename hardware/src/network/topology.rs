//! Interconnect Topologies.
//!
//! A topology is the graph the network model is built over: one endpoint
//! node per controller, zero or more router nodes, and weighted links
//! between them. Endpoint nodes always come first (in controller order),
//! followed by router nodes, so `NodeId(i)` for `i < endpoint_count()` is the
//! `i`-th controller.
//!
//! Three families are supported:
//!
//! * **Crossbar**: every endpoint links to one shared switch.
//! * **Mesh**: one router per grid-placed controller, arranged in `rows`
//!   rows, with nearest-neighbour (optionally wraparound) links.
//! * **MeshDirCorner**: the same router grid, with directory controllers
//!   attached at the four corners.

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::protocol::{ControllerRole, ControllerSet};

/// Routing weight of links along a row.
pub const EAST_WEST_WEIGHT: u32 = 1;
/// Routing weight of links along a column, so routes resolve X before Y.
pub const NORTH_SOUTH_WEIGHT: u32 = 2;
/// Routing weight of endpoint-to-router links.
pub const EXTERNAL_WEIGHT: u32 = 1;

const DEFAULT_LINK_LATENCY: u32 = 1;

/// Failures while building a topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The topology selector names no known topology family.
    #[error("unsupported topology kind {0:?} (expected crossbar, mesh or mesh_dir_corner)")]
    UnsupportedTopologyKind(String),

    /// The grid-placed controllers cannot be arranged in `rows` equal rows.
    #[error("invalid mesh shape: {nodes} nodes cannot be arranged in {rows} rows")]
    InvalidMeshShape { nodes: usize, rows: usize },

    /// There are no controllers to connect.
    #[error("cannot build a topology without controllers")]
    NoControllers,
}

/// Topology family selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    Crossbar,
    Mesh,
    MeshDirCorner,
}

impl TopologyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyKind::Crossbar => "crossbar",
            TopologyKind::Mesh => "mesh",
            TopologyKind::MeshDirCorner => "mesh_dir_corner",
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopologyKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "crossbar" => Ok(TopologyKind::Crossbar),
            "mesh" => Ok(TopologyKind::Mesh),
            "mesh_dir_corner" => Ok(TopologyKind::MeshDirCorner),
            other => Err(TopologyError::UnsupportedTopologyKind(other.to_string())),
        }
    }
}

/// Shape parameters for the topology builders.
///
/// Crossbars only use the link latencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShapeParams {
    /// Number of mesh rows.
    pub rows: usize,
    /// Adds wraparound (torus) links to mesh kinds.
    pub wraparound: bool,
    /// Latency in cycles of endpoint-to-router links.
    pub ext_link_latency: u32,
    /// Latency in cycles of router-to-router links.
    pub int_link_latency: u32,
}

impl ShapeParams {
    /// Parameters for a plain mesh of `rows` rows.
    pub fn mesh(rows: usize) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            rows: 1,
            wraparound: false,
            ext_link_latency: DEFAULT_LINK_LATENCY,
            int_link_latency: DEFAULT_LINK_LATENCY,
        }
    }
}

/// Index of a node within its topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// What a topology node stands for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A controller; `controller` indexes `ControllerSet::all()`.
    Endpoint {
        controller: usize,
        name: String,
        role: ControllerRole,
    },
    /// A switching element carrying no controller.
    Router,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_router(&self) -> bool {
        matches!(self.kind, NodeKind::Router)
    }

    pub fn is_endpoint(&self) -> bool {
        !self.is_router()
    }

    /// Name of the controller this node stands for.
    pub fn controller_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Endpoint { name, .. } => Some(name),
            NodeKind::Router => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Endpoint to router (or switch).
    External,
    /// Router to router.
    Internal,
}

/// An undirected link between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    pub kind: LinkKind,
    pub weight: u32,
    pub latency: u32,
}

impl Link {
    /// The end of the link opposite `node`, if `node` is on the link.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Dimensions of a mesh router grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridShape {
    rows: usize,
    columns: usize,
}

impl GridShape {
    /// Creates a `rows` by `columns` grid, or `None` if either is zero.
    pub fn new(rows: usize, columns: usize) -> Option<Self> {
        (rows > 0 && columns > 0).then_some(Self { rows, columns })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of router positions in the grid.
    pub fn positions(&self) -> usize {
        self.rows * self.columns
    }

    /// Position index of the router at `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.columns + col
    }

    /// Distinct corner positions, in top-left, top-right, bottom-left,
    /// bottom-right order.
    pub fn corners(&self) -> Vec<usize> {
        let mut corners = vec![
            self.index(0, 0),
            self.index(0, self.columns - 1),
            self.index(self.rows - 1, 0),
            self.index(self.rows - 1, self.columns - 1),
        ];
        corners.sort_unstable();
        corners.dedup();
        corners
    }
}

/// An immutable interconnect graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Topology {
    kind: TopologyKind,
    nodes: Vec<Node>,
    links: Vec<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grid: Option<GridShape>,
    #[serde(skip)]
    adjacency: Vec<Vec<usize>>,
}

impl Topology {
    fn new(
        kind: TopologyKind,
        nodes: Vec<Node>,
        links: Vec<Link>,
        grid: Option<GridShape>,
    ) -> Self {
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, link) in links.iter().enumerate() {
            adjacency[link.a.0].push(i);
            adjacency[link.b.0].push(i);
        }
        Self {
            kind,
            nodes,
            links,
            grid,
            adjacency,
        }
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Router grid shape for mesh kinds.
    pub fn grid(&self) -> Option<GridShape> {
        self.grid
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_endpoint())
    }

    pub fn routers(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_router())
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints().count()
    }

    pub fn router_count(&self) -> usize {
        self.routers().count()
    }

    /// Links incident to `node`.
    pub fn links_of(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.adjacency
            .get(node.0)
            .into_iter()
            .flatten()
            .map(move |&i| &self.links[i])
    }

    /// Nodes directly linked to `node`.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.links_of(node).filter_map(move |l| l.other(node))
    }

    /// Router that the endpoint for controller `name` attaches to.
    pub fn attachment_of(&self, name: &str) -> Option<NodeId> {
        let endpoint = self
            .endpoints()
            .find(|n| n.controller_name() == Some(name))?;
        self.neighbours(endpoint.id)
            .find(|&n| self.nodes[n.0].is_router())
    }

    /// Number of links on the shortest path from `from` to `to`.
    pub fn hop_distance(&self, from: NodeId, to: NodeId) -> Option<usize> {
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return None;
        }
        let mut dist = vec![usize::MAX; self.nodes.len()];
        let mut queue = VecDeque::new();
        dist[from.0] = 0;
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            if node == to {
                return Some(dist[node.0]);
            }
            for next in self.neighbours(node) {
                if dist[next.0] == usize::MAX {
                    dist[next.0] = dist[node.0] + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Minimum path cost from `from` to every node.
    ///
    /// A path costs the sum of `link_cost` over its links plus `node_cost`
    /// over every node it passes through (not counting the two ends).
    pub fn shortest_paths<N, L>(
        &self,
        from: NodeId,
        node_cost: N,
        link_cost: L,
    ) -> Vec<Option<u64>>
    where
        N: Fn(&Node) -> u64,
        L: Fn(&Link) -> u64,
    {
        let mut dist: Vec<Option<u64>> = vec![None; self.nodes.len()];
        if from.0 >= self.nodes.len() {
            return dist;
        }
        let mut heap = BinaryHeap::new();
        dist[from.0] = Some(0);
        heap.push(Reverse((0u64, from.0)));

        while let Some(Reverse((cost, idx))) = heap.pop() {
            if dist[idx].is_some_and(|d| cost > d) {
                continue;
            }
            let transit = if idx == from.0 {
                0
            } else {
                node_cost(&self.nodes[idx])
            };
            for link in self.links_of(NodeId(idx)) {
                let Some(next) = link.other(NodeId(idx)) else {
                    continue;
                };
                let candidate = cost + transit + link_cost(link);
                if dist[next.0].map_or(true, |d| candidate < d) {
                    dist[next.0] = Some(candidate);
                    heap.push(Reverse((candidate, next.0)));
                }
            }
        }
        dist
    }
}

/// Builds a topology of `kind` over `controllers`.
///
/// # Errors
///
/// * `TopologyError::NoControllers` for an empty controller set.
/// * `TopologyError::InvalidMeshShape` for mesh kinds whose grid-placed
///   controller count is not a positive multiple of `shape.rows`.
pub fn build(
    kind: TopologyKind,
    controllers: &ControllerSet,
    shape: &ShapeParams,
) -> Result<Topology, TopologyError> {
    let topology = match kind {
        TopologyKind::Crossbar => make_crossbar(controllers, shape)?,
        TopologyKind::Mesh => make_mesh(controllers, shape)?,
        TopologyKind::MeshDirCorner => make_mesh_dir_corners(controllers, shape)?,
    };
    tracing::info!(
        kind = %kind,
        endpoints = topology.endpoint_count(),
        routers = topology.router_count(),
        links = topology.link_count(),
        "topology built"
    );
    Ok(topology)
}

fn endpoint_nodes(controllers: &ControllerSet) -> Vec<Node> {
    controllers
        .all()
        .iter()
        .enumerate()
        .map(|(i, c)| Node {
            id: NodeId(i),
            kind: NodeKind::Endpoint {
                controller: i,
                name: c.name().to_string(),
                role: c.role(),
            },
        })
        .collect()
}

fn external(endpoint: usize, router: NodeId, shape: &ShapeParams) -> Link {
    Link {
        a: NodeId(endpoint),
        b: router,
        kind: LinkKind::External,
        weight: EXTERNAL_WEIGHT,
        latency: shape.ext_link_latency,
    }
}

/// Connects every controller to a single shared switch.
pub fn make_crossbar(
    controllers: &ControllerSet,
    shape: &ShapeParams,
) -> Result<Topology, TopologyError> {
    if controllers.is_empty() {
        return Err(TopologyError::NoControllers);
    }
    let mut nodes = endpoint_nodes(controllers);
    let xbar = NodeId(nodes.len());
    nodes.push(Node {
        id: xbar,
        kind: NodeKind::Router,
    });

    let links = (0..controllers.len())
        .map(|i| external(i, xbar, shape))
        .collect();

    Ok(Topology::new(TopologyKind::Crossbar, nodes, links, None))
}

/// Validates the mesh shape and returns the grid plus the grid-placed
/// controller indices. DMA controllers are not grid-placed.
fn mesh_grid(
    controllers: &ControllerSet,
    rows: usize,
) -> Result<(GridShape, Vec<usize>), TopologyError> {
    if controllers.is_empty() {
        return Err(TopologyError::NoControllers);
    }
    let placed: Vec<usize> = controllers
        .all()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_dma())
        .map(|(i, _)| i)
        .collect();

    let nodes = placed.len();
    if rows == 0 || nodes == 0 || nodes % rows != 0 {
        return Err(TopologyError::InvalidMeshShape { nodes, rows });
    }
    let grid = GridShape {
        rows,
        columns: nodes / rows,
    };
    Ok((grid, placed))
}

/// Appends the grid routers and their row/column links.
fn mesh_fabric(
    grid: GridShape,
    first_router: usize,
    shape: &ShapeParams,
    nodes: &mut Vec<Node>,
    links: &mut Vec<Link>,
) {
    nodes.extend((0..grid.positions()).map(|p| Node {
        id: NodeId(first_router + p),
        kind: NodeKind::Router,
    }));
    let router = |row: usize, col: usize| NodeId(first_router + grid.index(row, col));
    let internal = |a: NodeId, b: NodeId, weight: u32| Link {
        a,
        b,
        kind: LinkKind::Internal,
        weight,
        latency: shape.int_link_latency,
    };

    for row in 0..grid.rows {
        for col in 0..grid.columns.saturating_sub(1) {
            let (west, east) = (router(row, col), router(row, col + 1));
            links.push(internal(west, east, EAST_WEST_WEIGHT));
        }
        if shape.wraparound && grid.columns > 2 {
            let (last, first) = (router(row, grid.columns - 1), router(row, 0));
            links.push(internal(last, first, EAST_WEST_WEIGHT));
        }
    }

    for col in 0..grid.columns {
        for row in 0..grid.rows.saturating_sub(1) {
            let (north, south) = (router(row, col), router(row + 1, col));
            links.push(internal(north, south, NORTH_SOUTH_WEIGHT));
        }
        if shape.wraparound && grid.rows > 2 {
            let (last, first) = (router(grid.rows - 1, col), router(0, col));
            links.push(internal(last, first, NORTH_SOUTH_WEIGHT));
        }
    }
}

/// Attaches DMA controllers to router 0.
fn attach_dma(
    controllers: &ControllerSet,
    first_router: usize,
    shape: &ShapeParams,
    links: &mut Vec<Link>,
) {
    for (i, c) in controllers.all().iter().enumerate() {
        if c.is_dma() {
            links.push(external(i, NodeId(first_router), shape));
        }
    }
}

/// Builds a mesh with one router per grid-placed controller.
///
/// The `k`-th grid-placed controller attaches to the router at grid
/// position `k` (row-major).
pub fn make_mesh(
    controllers: &ControllerSet,
    shape: &ShapeParams,
) -> Result<Topology, TopologyError> {
    let (grid, placed) = mesh_grid(controllers, shape.rows)?;
    let mut nodes = endpoint_nodes(controllers);
    let first_router = nodes.len();
    let mut links = Vec::new();

    for (position, &controller) in placed.iter().enumerate() {
        links.push(external(controller, NodeId(first_router + position), shape));
    }
    attach_dma(controllers, first_router, shape, &mut links);
    mesh_fabric(grid, first_router, shape, &mut nodes, &mut links);

    Ok(Topology::new(TopologyKind::Mesh, nodes, links, Some(grid)))
}

/// Builds the mesh router grid with directories attached at the corners.
///
/// Directories are spread round-robin over the distinct corner routers.
/// Sequencers take the non-corner routers in row-major order first and
/// spill onto corner routers only once those run out.
pub fn make_mesh_dir_corners(
    controllers: &ControllerSet,
    shape: &ShapeParams,
) -> Result<Topology, TopologyError> {
    let (grid, placed) = mesh_grid(controllers, shape.rows)?;
    let mut nodes = endpoint_nodes(controllers);
    let first_router = nodes.len();
    let mut links = Vec::new();

    let corners = grid.corners();
    let compute_positions: Vec<usize> = (0..grid.positions())
        .filter(|p| !corners.contains(p))
        .chain(corners.iter().copied())
        .collect();

    let mut next_dir = 0;
    let mut next_compute = 0;
    for &controller in &placed {
        let position = if controllers.all()[controller].is_directory() {
            let p = corners[next_dir % corners.len()];
            next_dir += 1;
            p
        } else {
            let p = compute_positions[next_compute % compute_positions.len()];
            next_compute += 1;
            p
        };
        links.push(external(controller, NodeId(first_router + position), shape));
    }
    attach_dma(controllers, first_router, shape, &mut links);
    mesh_fabric(grid, first_router, shape, &mut nodes, &mut links);

    Ok(Topology::new(TopologyKind::MeshDirCorner, nodes, links, Some(grid)))
}
