//! Packed PMP configuration byte.
//!
//! Layout of one `pmpcfg` entry:
//!
//! ```text
//!   7   6 5   4 3   2   1   0
//! +---+-----+-----+---+---+---+
//! | L |  0  |  A  | X | W | R |
//! +---+-----+-----+---+---+---+
//! ```

use bitflags::bitflags;
use core::fmt;

const A_SHIFT: u8 = 3;
const A_MASK: u8 = 0b11 << A_SHIFT;
const L_BIT: u8 = 1 << 7;

bitflags! {
    /// Access permissions granted by a region.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Permissions: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EXECUTE = 1 << 2;
    }
}

/// How a region's address register is interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressMode {
    /// Region disabled.
    Off = 0,
    /// Top of range: the previous region's address is the lower bound.
    Tor = 1,
    /// Naturally aligned 4-byte region.
    Na4 = 2,
    /// Naturally aligned power-of-two region, size encoded in the address.
    Napot = 3,
}

impl AddressMode {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AddressMode::Off,
            1 => AddressMode::Tor,
            2 => AddressMode::Na4,
            _ => AddressMode::Napot,
        }
    }
}

/// Returned when trying to edit a locked configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConfigLocked;

/// One region's configuration byte.
///
/// Every mutator refuses to touch a value whose lock bit is set, so a
/// locked configuration read back from hardware cannot be edited on any path.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct PmpConfig(u8);

impl PmpConfig {
    /// Disabled, no permissions, unlocked.
    pub const OFF: Self = Self(0);

    pub const fn new(mode: AddressMode, permissions: Permissions) -> Self {
        Self(((mode as u8) << A_SHIFT) | permissions.bits())
    }

    /// Reinterpret a raw `pmpcfg` byte. Reserved bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & (L_BIT | A_MASK | Permissions::all().bits()))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn permissions(self) -> Permissions {
        Permissions::from_bits_truncate(self.0)
    }

    pub const fn readable(self) -> bool {
        self.0 & Permissions::READ.bits() != 0
    }

    pub const fn writable(self) -> bool {
        self.0 & Permissions::WRITE.bits() != 0
    }

    pub const fn executable(self) -> bool {
        self.0 & Permissions::EXECUTE.bits() != 0
    }

    pub const fn address_mode(self) -> AddressMode {
        AddressMode::from_bits(self.0 >> A_SHIFT)
    }

    pub const fn locked(self) -> bool {
        self.0 & L_BIT != 0
    }

    /// The same configuration with the lock bit set.
    pub const fn with_lock(self) -> Self {
        Self(self.0 | L_BIT)
    }

    /// The same configuration with the mode forced to OFF and the lock bit
    /// cleared.
    pub(crate) const fn disabled(self) -> Self {
        Self(self.0 & !(A_MASK | L_BIT))
    }

    fn ensure_unlocked(&self) -> Result<(), ConfigLocked> {
        if self.locked() {
            Err(ConfigLocked)
        } else {
            Ok(())
        }
    }

    fn set_permission(&mut self, permission: Permissions, on: bool) -> Result<(), ConfigLocked> {
        self.ensure_unlocked()?;
        if on {
            self.0 |= permission.bits();
        } else {
            self.0 &= !permission.bits();
        }
        Ok(())
    }

    pub fn set_readable(&mut self, on: bool) -> Result<(), ConfigLocked> {
        self.set_permission(Permissions::READ, on)
    }

    pub fn set_writable(&mut self, on: bool) -> Result<(), ConfigLocked> {
        self.set_permission(Permissions::WRITE, on)
    }

    pub fn set_executable(&mut self, on: bool) -> Result<(), ConfigLocked> {
        self.set_permission(Permissions::EXECUTE, on)
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) -> Result<(), ConfigLocked> {
        self.ensure_unlocked()?;
        self.0 = (self.0 & !A_MASK) | ((mode as u8) << A_SHIFT);
        Ok(())
    }
}

impl fmt::Debug for PmpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PmpConfig")
            .field("r", &self.readable())
            .field("w", &self.writable())
            .field("x", &self.executable())
            .field("mode", &self.address_mode())
            .field("locked", &self.locked())
            .finish()
    }
}
