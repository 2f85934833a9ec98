//! PMP backend over the executing hart's CSRs.

use super::PmpRegisters;
use common::arch::riscv::csr;

/// The calling hart's PMP CSRs.
///
/// Zero-sized; must only be used on the hart that created it.
#[derive(Debug)]
pub struct HartPmp {
    _private: (),
}

impl HartPmp {
    /// # Safety
    ///
    /// - Must run in M-mode
    /// - The value must not migrate to another hart
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PmpRegisters for HartPmp {
    fn hart_id(&self) -> usize {
        csr::hart_id()
    }

    fn read_config(&self, region: usize) -> u8 {
        csr::read_pmpcfg_entry(region)
    }

    fn write_config(&mut self, region: usize, bits: u8) {
        unsafe { csr::write_pmpcfg_entry(region, bits) }
    }

    fn read_address(&self, region: usize) -> usize {
        csr::read_pmpaddr(region).unwrap_or(0)
    }

    fn write_address(&mut self, region: usize, address: usize) {
        unsafe { csr::write_pmpaddr(region, address) }
    }

    fn implemented_regions(&self) -> usize {
        csr::MAX_PMP_REGIONS
    }
}
