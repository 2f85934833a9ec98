//! Device descriptors and id-indexed device tables.
//!
//! Board modules declare these as statics; the driver layer only reads them.

use crate::hal::clock::Clock;
use core::fmt;

/// Integer id assigned to a device by its board table.
pub type DeviceId = usize;

/// Device lookup errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No device with this id in the table.
    OutOfRange { id: DeviceId, count: usize },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::OutOfRange { id, count } => {
                write!(f, "device {id} out of range ({count} present)")
            }
        }
    }
}

/// Static description of one UART instance.
#[derive(Copy, Clone)]
pub struct UartDescriptor {
    /// Base address of the register block.
    pub base: usize,
    /// Clock feeding the baud generator, if the board wires one.
    pub clock: Option<&'static Clock>,
    pub interrupt_line: Option<u32>,
}

/// Static description of one hart.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HartDescriptor {
    pub hart_id: usize,
    /// Number of usable PMP regions on this hart.
    pub pmp_regions: usize,
}

/// Id-indexed table of device handles.
pub struct DeviceTable<T: ?Sized + 'static> {
    entries: &'static [&'static T],
}

impl<T: ?Sized + 'static> DeviceTable<T> {
    pub const fn new(entries: &'static [&'static T]) -> Self {
        Self { entries }
    }

    /// Look up a device by id.
    pub fn get(&self, id: DeviceId) -> Result<&'static T, DeviceError> {
        self.entries
            .get(id)
            .copied()
            .ok_or(DeviceError::OutOfRange {
                id,
                count: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static T> + '_ {
        self.entries.iter().copied()
    }
}

impl<T: ?Sized + 'static> Clone for DeviceTable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized + 'static> Copy for DeviceTable<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    static FIRST: u32 = 10;
    static SECOND: u32 = 20;
    static ENTRIES: [&u32; 2] = [&FIRST, &SECOND];

    #[test]
    fn lookup_by_id() {
        let table = DeviceTable::new(&ENTRIES);

        assert_eq!(table.len(), 2);
        assert_eq!(*table.get(1).unwrap(), 20);
    }

    #[test]
    fn out_of_range_id_is_reported() {
        let table = DeviceTable::new(&ENTRIES);

        assert_eq!(
            table.get(2).unwrap_err(),
            DeviceError::OutOfRange { id: 2, count: 2 }
        );
    }

    #[test]
    fn empty_table_rejects_everything() {
        let table: DeviceTable<u32> = DeviceTable::new(&[]);

        assert!(table.is_empty());
        assert!(table.get(0).is_err());
    }
}
