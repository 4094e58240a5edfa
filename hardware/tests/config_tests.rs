//! Integration tests for configuration parsing.

use ruby_memsys::common::{AssemblyError, ConfigError, MemorySize};
use ruby_memsys::config::*;
use ruby_memsys::network::{NetworkKind, TopologyError, TopologyKind};
use ruby_memsys::protocol::ProtocolRegistry;
use ruby_memsys::system::create_system;

fn config_path(name: &str) -> String {
    format!("{}/configs/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Tests that an empty file yields every default.
#[test]
fn test_empty_config_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.ruby.protocol, "MI_example");
    assert_eq!(config.ruby.topology, "crossbar");
    assert_eq!(config.ruby.mesh_rows, 1);
    assert_eq!(config.ruby.garnet_network, None);
    assert_eq!(config.ruby.num_cpus, 1);
    assert_eq!(config.physmem.size, MemorySize::mib(512));
    assert_eq!(config.network.ext_link_latency, 1);
    assert_eq!(config.network.simple.endpoint_bandwidth, 10000);
    assert_eq!(config.network.garnet.flit_size, 16);
    assert_eq!(config.debug.filter_string, "none");
    assert!(!config.debug.protocol_trace);
}

/// Tests parsing of selectors, sizes and clocks.
#[test]
fn test_config_values() {
    let config = Config::from_toml_str(
        r#"
        [ruby]
        topology = "mesh_dir_corner"
        mesh_rows = 4
        wraparound = true
        garnet_network = "flexible"
        clock = "500MHz"

        [physmem]
        base = "0x80000000"
        size = "256MB"

        [network]
        int_link_latency = 3
        "#,
    )
    .unwrap();

    assert_eq!(config.ruby.topology_kind().unwrap(), TopologyKind::MeshDirCorner);
    assert_eq!(config.ruby.network_kind().unwrap(), NetworkKind::FlexibleGarnet);
    assert_eq!(config.ruby.clock.period_ticks(), 2000);

    let range = config.physmem.range().unwrap();
    assert_eq!(range.first(), 0x8000_0000);
    assert_eq!(range.size(), MemorySize::mib(256));

    let shape = config.shape_params();
    assert_eq!(shape.rows, 4);
    assert!(shape.wraparound);
    assert_eq!(shape.int_link_latency, 3);
    assert_eq!(shape.ext_link_latency, 1);
}

/// Tests that unknown selectors are reported as typed errors.
#[test]
fn test_unknown_selectors() {
    let mut config = Config::default();
    config.ruby.topology = "ring".to_string();
    assert_eq!(
        config.ruby.topology_kind(),
        Err(TopologyError::UnsupportedTopologyKind("ring".to_string()))
    );

    let registry = ProtocolRegistry::with_builtin();
    let err = create_system(&config, &registry, &[]).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::Topology(TopologyError::UnsupportedTopologyKind(_))
    ));

    config.ruby.topology = "crossbar".to_string();
    config.ruby.garnet_network = Some("adaptive".to_string());
    let err = create_system(&config, &registry, &[]).unwrap_err();
    assert!(matches!(err, AssemblyError::Network(_)));
}

/// Tests that malformed values fail to load.
#[test]
fn test_invalid_values() {
    assert!(Config::from_toml_str("[physmem]\nsize = \"lots\"").is_err());
    assert!(Config::from_toml_str("[ruby]\nclock = \"quick\"").is_err());

    let config = Config::from_toml_str("[physmem]\nbase = \"0xzz\"").unwrap();
    assert!(matches!(config.physmem.range(), Err(ConfigError::Load(_))));
}

/// Tests DMA device handles derived from the device count.
#[test]
fn test_dma_devices() {
    let config = Config::from_toml_str("[ruby]\ndma_devices = 2").unwrap();
    let names: Vec<String> = config.dma_devices().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["dma0", "dma1"]);
}

/// Tests that the shipped configurations load and assemble.
#[test]
fn test_shipped_configs_assemble() {
    let registry = ProtocolRegistry::with_builtin();

    let config = Config::load(config_path("default.toml")).unwrap();
    let system = create_system(&config, &registry, &config.dma_devices()).unwrap();
    assert_eq!(system.mem_size(), MemorySize::gib(1));
    assert_eq!(system.ports().len(), 4);

    let config = Config::load(config_path("garnet_corners.toml")).unwrap();
    let system = create_system(&config, &registry, &config.dma_devices()).unwrap();
    assert_eq!(system.network().kind(), NetworkKind::FixedGarnet);
    assert_eq!(system.mem_size(), MemorySize::gib(2));
    assert_eq!(system.ports().len(), 16);
    assert_eq!(system.network().routers().len(), 20);
}

/// Tests that a missing file is a load error.
#[test]
fn test_missing_file() {
    assert!(matches!(
        Config::load(config_path("does_not_exist.toml")),
        Err(ConfigError::Load(_))
    ));
}
