//! Memory-mapped register access.

use core::ptr::{read_volatile, write_volatile};

/// Access to one peripheral's register block.
///
/// Offsets are in bytes from the start of the block. Implementations other
/// than [`Mmio`] exist so drivers can run against in-memory register models.
pub trait RegisterIo: Sync {
    /// Read a 32-bit register.
    fn read32(&self, offset: usize) -> u32;

    /// Write a 32-bit register.
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write: set `mask` bits.
    fn set_bits32(&self, offset: usize, mask: u32) {
        let value = self.read32(offset);
        self.write32(offset, value | mask);
    }

    /// Read-modify-write: clear `mask` bits.
    fn clear_bits32(&self, offset: usize, mask: u32) {
        let value = self.read32(offset);
        self.write32(offset, value & !mask);
    }

    /// Read-modify-write: replace the bits under `mask` with `value`.
    fn modify32(&self, offset: usize, mask: u32, value: u32) {
        let current = self.read32(offset);
        self.write32(offset, (current & !mask) | (value & mask));
    }
}

/// Volatile register block at a fixed physical address.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a register block handle.
    ///
    /// # Safety
    ///
    /// - `base` must point to a mapped peripheral register block
    /// - Memory must be accessible as device memory
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block.
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterIo for Mmio {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}
