//! Integration tests for network model construction.

use ruby_memsys::common::{AddrRange, MemorySize};
use ruby_memsys::network::topology::{build, NodeId, ShapeParams, TopologyKind};
use ruby_memsys::network::*;
use ruby_memsys::protocol::{Controller, ControllerSet};
use std::sync::Arc;

fn controllers(seqs: usize, dirs: usize) -> ControllerSet {
    let slice = MemorySize::mib(64);
    let mut all: Vec<Controller> = (0..seqs).map(Controller::sequencer).collect();
    for i in 0..dirs {
        let range = AddrRange::with_size(i as u64 * slice.bytes(), slice).unwrap();
        all.push(Controller::directory(i, range));
    }
    ControllerSet::new(all)
}

fn topology(kind: TopologyKind, seqs: usize, dirs: usize, rows: usize) -> Arc<Topology> {
    Arc::new(build(kind, &controllers(seqs, dirs), &ShapeParams::mesh(rows)).unwrap())
}

/// Tests network kind parsing from option strings.
#[test]
fn test_network_kind_parse() {
    assert_eq!("simple".parse::<NetworkKind>().unwrap(), NetworkKind::Simple);
    assert_eq!("fixed".parse::<NetworkKind>().unwrap(), NetworkKind::FixedGarnet);
    assert_eq!("flexible".parse::<NetworkKind>().unwrap(), NetworkKind::FlexibleGarnet);
    assert_eq!(
        "flexible-garnet".parse::<NetworkKind>().unwrap(),
        NetworkKind::FlexibleGarnet
    );
    assert_eq!(
        "wormhole".parse::<NetworkKind>(),
        Err(NetworkError::UnsupportedNetworkKind("wormhole".to_string()))
    );
}

/// Tests that an absent garnet option selects the simple network.
#[test]
fn test_garnet_option_mapping() {
    assert_eq!(NetworkKind::from_garnet_option(None).unwrap(), NetworkKind::Simple);
    assert_eq!(
        NetworkKind::from_garnet_option(Some("fixed")).unwrap(),
        NetworkKind::FixedGarnet
    );
    assert!(NetworkKind::from_garnet_option(Some("bogus")).is_err());
}

/// Tests that repeated creation yields independent, structurally equal networks.
#[test]
fn test_create_is_repeatable() {
    let topo = topology(TopologyKind::Mesh, 4, 4, 2);
    for kind in [NetworkKind::Simple, NetworkKind::FixedGarnet, NetworkKind::FlexibleGarnet] {
        let a = create(kind, topo.clone()).unwrap();
        let b = create(kind, topo.clone()).unwrap();
        assert_eq!(a.kind(), kind);
        assert_eq!(a.node_count(), b.node_count());
        assert_eq!(a.link_count(), b.link_count());
        assert_eq!(a.routers(), b.routers());
        assert_eq!(a.link_models(), b.link_models());
        assert_eq!(a.node_count(), topo.node_count());
    }
}

/// Tests that the simple network models no routers.
#[test]
fn test_simple_network_ignores_routers() {
    let topo = topology(TopologyKind::Mesh, 4, 4, 2);
    let net = create(NetworkKind::Simple, topo.clone()).unwrap();

    assert!(net.routers().is_empty());
    assert!(net.link_models().is_empty());
    assert!(net.as_garnet().is_none());
    let simple = net.as_simple().unwrap();
    assert_eq!(simple.endpoint_count(), 8);
    assert_eq!(simple.params().endpoint_bandwidth, 10000);
}

/// Tests garnet router and link models mirror the topology.
#[test]
fn test_garnet_models_follow_topology() {
    let topo = topology(TopologyKind::Mesh, 4, 4, 2);
    let net = create(NetworkKind::FixedGarnet, topo.clone()).unwrap();

    assert_eq!(net.routers().len(), topo.router_count());
    assert_eq!(net.link_models().len(), topo.link_count());

    // Corner router of a 2x4 grid: one endpoint, one east, one south link.
    let corner = net.routers().iter().find(|r| r.node == NodeId(8)).unwrap();
    assert_eq!(corner.ports, 3);
    assert_eq!(corner.vcs_per_class, 4);
    // Four data VCs of four flits and four control VCs of one flit per port.
    assert_eq!(corner.buffer_slots, 3 * 4 * (4 + 1));
}

/// Tests that control VC buffers count towards each router's buffer slots.
#[test]
fn test_garnet_ctrl_buffers() {
    let topo = topology(TopologyKind::Crossbar, 2, 2, 1);
    let deep_ctrl = NetworkParams {
        garnet: GarnetParams {
            buffers_per_ctrl_vc: 3,
            ..GarnetParams::default()
        },
        ..NetworkParams::default()
    };

    let shallow = create(NetworkKind::FixedGarnet, topo.clone()).unwrap();
    let deep = create_with(NetworkKind::FixedGarnet, topo.clone(), &deep_ctrl).unwrap();

    // The crossbar switch has one port per endpoint.
    let switch = |net: &Network| net.routers()[0].buffer_slots;
    assert_eq!(switch(&shallow), 4 * 4 * (4 + 1));
    assert_eq!(switch(&deep), 4 * 4 * (4 + 3));
}

/// Tests that oversized garnet buffers fail creation instead of wrapping.
#[test]
fn test_garnet_buffer_overflow() {
    let topo = topology(TopologyKind::Crossbar, 2, 2, 1);
    let huge = NetworkParams {
        garnet: GarnetParams {
            vcs_per_class: u32::MAX,
            buffers_per_data_vc: u32::MAX,
            buffers_per_ctrl_vc: u32::MAX,
            ..GarnetParams::default()
        },
        ..NetworkParams::default()
    };
    for kind in [NetworkKind::FixedGarnet, NetworkKind::FlexibleGarnet] {
        let err = create_with(kind, topo.clone(), &huge).unwrap_err();
        assert_eq!(err, NetworkError::BufferOverflow { router: 4 });
    }

    // Large but representable counts are kept exactly.
    let wide = NetworkParams {
        garnet: GarnetParams {
            vcs_per_class: 70000,
            buffers_per_data_vc: 70000,
            ..GarnetParams::default()
        },
        ..NetworkParams::default()
    };
    let net = create_with(NetworkKind::FixedGarnet, topo.clone(), &wide).unwrap();
    assert_eq!(net.routers()[0].buffer_slots, 4 * 70000 * (70000 + 1));
}

/// Tests that only the flexible variant honours the pipeline depth.
#[test]
fn test_garnet_pipeline_depth() {
    let topo = topology(TopologyKind::Crossbar, 2, 2, 1);
    let params = NetworkParams {
        garnet: GarnetParams {
            number_of_pipe_stages: 2,
            ..GarnetParams::default()
        },
        ..NetworkParams::default()
    };

    let fixed = create_with(NetworkKind::FixedGarnet, topo.clone(), &params).unwrap();
    let flexible = create_with(NetworkKind::FlexibleGarnet, topo.clone(), &params).unwrap();

    assert!(fixed.routers().iter().all(|r| r.pipe_stages == garnet::FIXED_PIPELINE_STAGES));
    assert!(flexible.routers().iter().all(|r| r.pipe_stages == 2));
    assert_eq!(fixed.as_garnet().unwrap().variant(), GarnetVariant::Fixed);
    assert_eq!(flexible.as_garnet().unwrap().variant(), GarnetVariant::Flexible);
}

/// Tests endpoint-to-endpoint latencies across a crossbar.
#[test]
fn test_crossbar_latency() {
    let topo = topology(TopologyKind::Crossbar, 2, 2, 1);
    let simple = create(NetworkKind::Simple, topo.clone()).unwrap();
    let fixed = create(NetworkKind::FixedGarnet, topo.clone()).unwrap();

    assert_eq!(simple.latency(NodeId(0), NodeId(0)), Some(0));
    assert_eq!(simple.latency(NodeId(0), NodeId(3)), Some(2));
    // Two links plus one traversal of the switch pipeline.
    assert_eq!(fixed.latency(NodeId(0), NodeId(3)), Some(6));

    let xbar = NodeId(4);
    assert_eq!(simple.latency(NodeId(0), xbar), None);
    assert_eq!(fixed.latency(NodeId(0), xbar), None);
}

/// Tests latencies across a 1x2 mesh.
#[test]
fn test_mesh_latency() {
    let topo = topology(TopologyKind::Mesh, 1, 1, 1);
    let params = NetworkParams {
        garnet: GarnetParams {
            number_of_pipe_stages: 3,
            ..GarnetParams::default()
        },
        ..NetworkParams::default()
    };
    let simple = create(NetworkKind::Simple, topo.clone()).unwrap();
    let flexible = create_with(NetworkKind::FlexibleGarnet, topo.clone(), &params).unwrap();

    // endpoint -> router -> router -> endpoint
    assert_eq!(simple.latency(NodeId(0), NodeId(1)), Some(3));
    assert_eq!(flexible.latency(NodeId(0), NodeId(1)), Some(3 + 2 * 3));
}
