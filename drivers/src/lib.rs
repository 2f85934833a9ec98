//! RISC-V SoC Peripheral Driver Subsystem
//!
//! This crate provides a layered architecture for peripheral access on
//! RISC-V system-on-chip boards:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent capability traits (UART, clock, DMA, MMIO)
//! - [`device`]: Descriptor records and id-indexed device tables
//! - [`pmp`]: Physical Memory Protection region manager
//! - [`peripheral`]: Vendor drivers implementing the HAL traits
//! - [`platform`]: Per-board descriptor tables, selected by cargo feature
//! - [`console`]: `log` backend writing through a UART
//!
//! # Design Principles
//!
//! 1. **Build-time variants**: the board feature fixes which driver backs
//!    each device; call sites only see the HAL traits
//! 2. **No shared base pointers**: every driver carries its own register block
//! 3. **Status, not panics**: recoverable failures are returned as `Result`;
//!    only a hardware timeout during UART bring-up halts
//!
//! # Usage Example
//!
//! ```no_run
//! use rvhal_drivers::hal::uart::Uart;
//! use rvhal_drivers::platform;
//!
//! let uart = platform::uart(0).unwrap();
//! uart.init(115_200).unwrap();
//! for &byte in b"Hello, world!\n" {
//!     uart.put_char(byte).unwrap();
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod device;
pub mod hal;
pub mod peripheral;
pub mod platform;
pub mod pmp;

// Re-export commonly used types
pub use device::{DeviceError, DeviceTable};
pub use hal::clock::{Clock, ClockSource};
pub use hal::uart::{LineFormat, Uart, UartError};
pub use pmp::{AddressMode, Pmp, PmpConfig, PmpError};

extern crate alloc;
