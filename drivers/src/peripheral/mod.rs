//! Peripheral Drivers
//!
//! This module contains drivers for reusable peripherals that
//! can be found across different boards.
//!
//! # Available Peripherals
//!
//! - [`nb2uart0`]: SiFive NB2 UART (DesignWare 16550-compatible)
//! - [`sifive_uart0`]: SiFive UART0
//! - [`clock`]: fixed external clocks and the FE310 low-frequency oscillator

pub mod clock;
pub mod nb2uart0;
pub mod sifive_uart0;
