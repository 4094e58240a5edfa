//! Integration tests for controllers and the protocol registry.

use ruby_memsys::common::{AddrRange, MemorySize};
use ruby_memsys::config::RubyConfig;
use ruby_memsys::protocol::*;

fn options(num_cpus: usize, num_dirs: usize) -> RubyConfig {
    RubyConfig {
        num_cpus,
        num_dirs,
        ..RubyConfig::default()
    }
}

fn gib(n: u64) -> AddrRange {
    AddrRange::with_size(0, MemorySize::gib(n)).unwrap()
}

/// Tests controller constructors and role predicates.
#[test]
fn test_controller_roles() {
    let seq = Controller::sequencer(3);
    assert_eq!(seq.name(), "l1_cntrl3");
    assert_eq!(seq.version(), 3);
    assert!(seq.is_sequencer());
    assert_eq!(seq.directory_size(), None);

    let dir = Controller::directory(1, gib(1));
    assert_eq!(dir.name(), "dir_cntrl1");
    assert_eq!(dir.role(), ControllerRole::DirectoryController);
    assert_eq!(dir.directory_size(), Some(MemorySize::gib(1)));

    let dma = Controller::dma(0).with_name("dma_disk");
    assert!(dma.is_dma());
    assert_eq!(dma.name(), "dma_disk");
}

/// Tests controller set role filters.
#[test]
fn test_controller_set_filters() {
    let set: ControllerSet = vec![
        Controller::sequencer(0),
        Controller::directory(0, gib(1)),
        Controller::sequencer(1),
        Controller::dma(0),
    ]
    .into_iter()
    .collect();

    assert_eq!(set.len(), 4);
    assert_eq!(set.sequencer_count(), 2);
    assert_eq!(set.directory_count(), 1);
    assert_eq!(set.dma_controllers().count(), 1);
    let names: Vec<&str> = set.sequencers().map(|c| c.name()).collect();
    assert_eq!(names, vec!["l1_cntrl0", "l1_cntrl1"]);
}

/// Tests the registry reports unknown protocols.
#[test]
fn test_registry_unknown_protocol() {
    let registry = ProtocolRegistry::with_builtin();
    let err = registry
        .create_system("MOESI_hammer", &options(1, 1), &gib(1), &[])
        .unwrap_err();
    assert_eq!(err, ProtocolError::UnknownProtocol("MOESI_hammer".to_string()));
    assert!(ProtocolRegistry::new().get(MiExample::NAME).is_none());
}

/// Tests the built-in protocol is registered.
#[test]
fn test_registry_builtin() {
    let registry = ProtocolRegistry::with_builtin();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["MI_example"]);
    assert!(registry.get("MI_example").is_some());
}

/// Tests MI_example splits memory evenly across directories.
#[test]
fn test_mi_example_controllers() {
    let registry = ProtocolRegistry::with_builtin();
    let physmem = AddrRange::with_size(0x8000_0000, MemorySize::gib(1)).unwrap();
    let set = registry
        .create_system("MI_example", &options(4, 4), &physmem, &[])
        .unwrap();

    assert_eq!(set.sequencer_count(), 4);
    assert_eq!(set.directory_count(), 4);

    let dirs: Vec<&Controller> = set.directories().collect();
    for (i, d) in dirs.iter().enumerate() {
        let range = d.memory_range().unwrap();
        assert_eq!(range.size(), MemorySize::mib(256));
        assert_eq!(range.first(), 0x8000_0000 + i as u64 * (256 << 20));
    }
    assert_eq!(dirs[3].memory_range().unwrap().last(), physmem.last());
}

/// Tests MI_example orders controllers sequencers, directories, then DMA.
#[test]
fn test_mi_example_order_and_dma() {
    let devices = [DmaDevice::new("disk"), DmaDevice::new("nic")];
    let set = MiExample
        .create_system(&options(2, 1), &gib(1), &devices)
        .unwrap();

    let names: Vec<&str> = set.all().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec!["l1_cntrl0", "l1_cntrl1", "dir_cntrl0", "dma_cntrl0_disk", "dma_cntrl1_nic"]
    );
}

/// Tests MI_example rejects empty machines.
#[test]
fn test_mi_example_rejects_zero_counts() {
    let no_cpus = MiExample.create_system(&options(0, 1), &gib(1), &[]);
    assert!(matches!(no_cpus, Err(ProtocolError::Factory { .. })));

    let no_dirs = MiExample.create_system(&options(1, 0), &gib(1), &[]);
    assert!(matches!(no_dirs, Err(ProtocolError::Factory { .. })));

    let tiny = AddrRange::new(0, 2).unwrap();
    let too_many = MiExample.create_system(&options(1, 4), &tiny, &[]);
    assert!(matches!(too_many, Err(ProtocolError::Factory { .. })));
}

/// Tests that an uneven split leaves the remainder unowned.
#[test]
fn test_mi_example_uneven_split() {
    let physmem = AddrRange::with_size(0, MemorySize::from_bytes(1000)).unwrap();
    let set = MiExample.create_system(&options(1, 3), &physmem, &[]).unwrap();
    let total: u64 = set
        .directories()
        .filter_map(|d| d.directory_size())
        .map(|s| s.bytes())
        .sum();
    assert_eq!(total, 999);
}
