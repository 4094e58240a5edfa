//! MI_example Protocol.
//!
//! The two-state reference protocol: one L1 cache controller with its
//! sequencer per CPU, a configurable number of directories splitting
//! physical memory into equal contiguous slices, and one DMA controller per
//! DMA device.

use super::{Controller, ControllerSet, DmaDevice, ProtocolError, ProtocolFactory};
use crate::common::{AddrRange, MemorySize};
use crate::config::RubyConfig;

/// Factory for the MI_example protocol.
pub struct MiExample;

impl MiExample {
    pub const NAME: &'static str = "MI_example";

    fn reject(reason: impl Into<String>) -> ProtocolError {
        ProtocolError::Factory {
            protocol: Self::NAME.to_string(),
            reason: reason.into(),
        }
    }
}

impl ProtocolFactory for MiExample {
    fn name(&self) -> &str {
        Self::NAME
    }

    /// Directory `i` owns `[base + i * slice, base + (i + 1) * slice)`, with
    /// `slice = physmem.size / num_dirs`. Any remainder of an uneven split
    /// is left unowned and shows up as a memory mismatch later.
    fn create_system(
        &self,
        options: &RubyConfig,
        physmem: &AddrRange,
        dma_devices: &[DmaDevice],
    ) -> Result<ControllerSet, ProtocolError> {
        if options.num_cpus == 0 {
            return Err(Self::reject("at least one cpu is required"));
        }
        if options.num_dirs == 0 {
            return Err(Self::reject("at least one directory is required"));
        }

        let slice = physmem.size().bytes() / options.num_dirs as u64;
        if slice == 0 {
            return Err(Self::reject(format!(
                "physical memory of {} cannot be split across {} directories",
                physmem.size(),
                options.num_dirs
            )));
        }

        let capacity = options.num_cpus + options.num_dirs + dma_devices.len();
        let mut controllers = Vec::with_capacity(capacity);
        controllers.extend((0..options.num_cpus).map(Controller::sequencer));

        for i in 0..options.num_dirs {
            let base = physmem.first() + i as u64 * slice;
            let range = AddrRange::with_size(base, MemorySize::from_bytes(slice))
                .map_err(|e| Self::reject(e.to_string()))?;
            controllers.push(Controller::directory(i, range));
        }

        for (i, dev) in dma_devices.iter().enumerate() {
            controllers.push(Controller::dma(i).with_name(format!("dma_cntrl{}_{}", i, dev.name)));
        }

        tracing::debug!(
            cpus = options.num_cpus,
            dirs = options.num_dirs,
            dma = dma_devices.len(),
            slice = %MemorySize::from_bytes(slice),
            "MI_example controllers created"
        );

        Ok(ControllerSet::new(controllers))
    }
}
