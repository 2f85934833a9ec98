//! Architecture primitives shared by the driver crate.
//!
//! - [`arch`]: RISC-V control and status register access
//! - [`math`]: integer helpers used by clock and baud-rate code

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod math;
