//! Physical Memory Protection (PMP) region manager.
//!
//! The manager edits the PMP entries of the hart it runs on. Two rules hold
//! on every path, bulk or per-field:
//!
//! - a locked region is never written; the attempt fails and nothing changes.
//!   A region below a locked TOR entry counts as locked, since its address
//!   is that entry's lower bound
//! - mode and address are committed together: the region is disabled, its
//!   address written, then its final configuration written, so no access is
//!   ever checked against a new mode paired with an old address. A write
//!   the hardware does not take exactly is rolled back
//!
//! Region counts come from the board's [`HartDescriptor`] table and are
//! looked up on every call, since harts on one SoC may differ.

mod address;
mod config;
cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
        mod csr;
        pub use csr::HartPmp;
    }
}

pub use address::{na4, napot, tor};
pub use config::{AddressMode, ConfigLocked, Permissions, PmpConfig};

use crate::device::HartDescriptor;
use core::fmt;
use log::debug;

/// PMP errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PmpError {
    /// Region index beyond what the calling hart implements.
    OutOfRange { region: usize, count: usize },
    /// Region is locked until the next hart reset.
    Locked { region: usize },
    /// Hardware did not retain the written configuration (fused entry).
    Rejected { region: usize },
    /// The board table does not describe this hart.
    UnknownHart { hart: usize },
    /// Address or size violates the alignment the addressing mode needs.
    Misaligned { address: usize, size: usize },
}

impl fmt::Display for PmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PmpError::OutOfRange { region, count } => {
                write!(f, "PMP region {region} out of range ({count} regions)")
            }
            PmpError::Locked { region } => write!(f, "PMP region {region} is locked"),
            PmpError::Rejected { region } => {
                write!(f, "PMP region {region} rejected the configuration")
            }
            PmpError::UnknownHart { hart } => write!(f, "no PMP description for hart {hart}"),
            PmpError::Misaligned { address, size } => {
                write!(f, "address {address:#x} not aligned for a {size}-byte region")
            }
        }
    }
}

/// Raw access to one hart's PMP entries.
///
/// Writes follow hardware WARL rules: a write to a locked or hard-wired
/// entry may be silently dropped.
pub trait PmpRegisters {
    fn hart_id(&self) -> usize;

    fn read_config(&self, region: usize) -> u8;

    fn write_config(&mut self, region: usize, bits: u8);

    fn read_address(&self, region: usize) -> usize;

    fn write_address(&mut self, region: usize, address: usize);

    /// Number of entries the backend can address at all.
    fn implemented_regions(&self) -> usize;
}

/// Number of usable PMP regions on `hart`, per the board table.
pub fn region_count(harts: &[HartDescriptor], hart: usize) -> Result<usize, PmpError> {
    harts
        .iter()
        .find(|desc| desc.hart_id == hart)
        .map(|desc| desc.pmp_regions)
        .ok_or(PmpError::UnknownHart { hart })
}

/// Bitmask of regions [`Pmp::init`] could not reset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SkippedRegions(u64);

impl SkippedRegions {
    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, region: usize) -> bool {
        region < 64 && self.0 & (1 << region) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    fn insert(&mut self, region: usize) {
        if region < 64 {
            self.0 |= 1 << region;
        }
    }
}

/// PMP manager for the calling hart.
pub struct Pmp<R: PmpRegisters> {
    regs: R,
    harts: &'static [HartDescriptor],
}

impl<R: PmpRegisters> Pmp<R> {
    pub const fn new(regs: R, harts: &'static [HartDescriptor]) -> Self {
        Self { regs, harts }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn hart_id(&self) -> usize {
        self.regs.hart_id()
    }

    /// Usable regions on the calling hart. An undescribed hart has none.
    pub fn region_count(&self) -> usize {
        region_count(self.harts, self.regs.hart_id())
            .map(|count| count.min(self.regs.implemented_regions()))
            .unwrap_or(0)
    }

    fn check_range(&self, region: usize) -> Result<(), PmpError> {
        let count = self.region_count();
        if region >= count {
            return Err(PmpError::OutOfRange { region, count });
        }
        Ok(())
    }

    fn read_config(&self, region: usize) -> PmpConfig {
        PmpConfig::from_bits(self.regs.read_config(region))
    }

    /// Reset every region of the calling hart to OFF, no permissions,
    /// unlocked, address 0.
    ///
    /// Locked or fused regions are left alone and reported in the returned
    /// mask; callers are free to ignore it.
    pub fn init(&mut self) -> SkippedRegions {
        let mut skipped = SkippedRegions::default();

        for region in 0..self.region_count() {
            if self.set_region(region, PmpConfig::OFF, 0).is_err() {
                skipped.insert(region);
            }
        }

        if !skipped.is_empty() {
            debug!(
                "pmp: hart {} left {} region(s) untouched (mask {:#x})",
                self.hart_id(),
                skipped.count(),
                skipped.bits()
            );
        }
        skipped
    }

    /// A locked TOR entry also locks the address register below it.
    fn address_locked_by_next(&self, region: usize) -> bool {
        let next = region + 1;
        if next >= self.regs.implemented_regions() {
            return false;
        }
        let config = self.read_config(next);
        config.locked() && config.address_mode() == AddressMode::Tor
    }

    fn commit(&mut self, region: usize, from: PmpConfig, config: PmpConfig, address: usize) {
        self.regs.write_config(region, from.disabled().bits());
        self.regs.write_address(region, address);
        self.regs.write_config(region, config.bits());
    }

    /// Replace a region's configuration and address together.
    ///
    /// If the hardware does not hold exactly `config` and `address`
    /// afterwards, the previous contents are written back and the call
    /// fails with [`PmpError::Rejected`].
    pub fn set_region(
        &mut self,
        region: usize,
        config: PmpConfig,
        address: usize,
    ) -> Result<(), PmpError> {
        self.check_range(region)?;

        let current = self.read_config(region);
        if current.locked() || self.address_locked_by_next(region) {
            return Err(PmpError::Locked { region });
        }
        let previous_address = self.regs.read_address(region);

        self.commit(region, current, config, address);

        if self.regs.read_config(region) != config.bits()
            || self.regs.read_address(region) != address
        {
            self.commit(region, current, current, previous_address);
            return Err(PmpError::Rejected { region });
        }
        Ok(())
    }

    /// Read a region's configuration and address. Locked regions stay
    /// readable.
    pub fn get_region(&self, region: usize) -> Result<(PmpConfig, usize), PmpError> {
        self.check_range(region)?;
        Ok((self.read_config(region), self.regs.read_address(region)))
    }

    /// Lock a region until the next hart reset. Locking twice is harmless.
    pub fn lock(&mut self, region: usize) -> Result<(), PmpError> {
        self.check_range(region)?;

        let current = self.read_config(region);
        if current.locked() {
            return Ok(());
        }

        let locked = current.with_lock();
        self.regs.write_config(region, locked.bits());
        if self.regs.read_config(region) != locked.bits() {
            return Err(PmpError::Rejected { region });
        }
        Ok(())
    }

    /// Apply `edit` to the region's configuration and commit it with the
    /// current address.
    fn update_config(
        &mut self,
        region: usize,
        edit: impl FnOnce(&mut PmpConfig) -> Result<(), ConfigLocked>,
    ) -> Result<(), PmpError> {
        let (mut config, address) = self.get_region(region)?;
        edit(&mut config).map_err(|ConfigLocked| PmpError::Locked { region })?;
        self.set_region(region, config, address)
    }

    pub fn set_address(&mut self, region: usize, address: usize) -> Result<(), PmpError> {
        let (config, _) = self.get_region(region)?;
        self.set_region(region, config, address)
    }

    pub fn address(&self, region: usize) -> Result<usize, PmpError> {
        self.get_region(region).map(|(_, address)| address)
    }

    pub fn set_address_mode(&mut self, region: usize, mode: AddressMode) -> Result<(), PmpError> {
        self.update_config(region, |cfg| cfg.set_address_mode(mode))
    }

    pub fn address_mode(&self, region: usize) -> Result<AddressMode, PmpError> {
        self.get_region(region).map(|(cfg, _)| cfg.address_mode())
    }

    pub fn set_executable(&mut self, region: usize, on: bool) -> Result<(), PmpError> {
        self.update_config(region, |cfg| cfg.set_executable(on))
    }

    pub fn executable(&self, region: usize) -> Result<bool, PmpError> {
        self.get_region(region).map(|(cfg, _)| cfg.executable())
    }

    pub fn set_writable(&mut self, region: usize, on: bool) -> Result<(), PmpError> {
        self.update_config(region, |cfg| cfg.set_writable(on))
    }

    pub fn writable(&self, region: usize) -> Result<bool, PmpError> {
        self.get_region(region).map(|(cfg, _)| cfg.writable())
    }

    pub fn set_readable(&mut self, region: usize, on: bool) -> Result<(), PmpError> {
        self.update_config(region, |cfg| cfg.set_readable(on))
    }

    pub fn readable(&self, region: usize) -> Result<bool, PmpError> {
        self.get_region(region).map(|(cfg, _)| cfg.readable())
    }
}
