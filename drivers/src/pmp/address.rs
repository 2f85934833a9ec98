//! Encoding of byte addresses into `pmpaddr` register values.
//!
//! `pmpaddr` holds bits `[XLEN+1:2]` of a physical address, so every
//! encoder shifts right by two.

use super::PmpError;

/// Encode the exclusive upper bound of a TOR region.
pub fn tor(top: usize) -> Result<usize, PmpError> {
    if top % 4 != 0 {
        return Err(PmpError::Misaligned { address: top, size: 4 });
    }
    Ok(top >> 2)
}

/// Encode the base of a naturally aligned 4-byte region.
pub fn na4(base: usize) -> Result<usize, PmpError> {
    if base % 4 != 0 {
        return Err(PmpError::Misaligned { address: base, size: 4 });
    }
    Ok(base >> 2)
}

/// Encode a naturally aligned power-of-two region.
///
/// `size` must be a power of two of at least 8 bytes and `base` must be a
/// multiple of it. The size is stored as a run of trailing one bits.
pub fn napot(base: usize, size: usize) -> Result<usize, PmpError> {
    if size < 8 || !size.is_power_of_two() || base % size != 0 {
        return Err(PmpError::Misaligned { address: base, size });
    }
    Ok((base >> 2) | ((size >> 3) - 1))
}
