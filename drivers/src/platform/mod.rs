//! Platform Abstraction Layer
//!
//! Each supported board implements the [`Platform`] trait by handing out its
//! static descriptor tables. The board is chosen at build time by cargo
//! feature and exported as [`CurrentPlatform`].
//!
//! # Usage
//!
//! ```no_run
//! use rvhal_drivers::platform;
//!
//! let console = platform::init_board(115_200).unwrap();
//! console.write(b"up\n").unwrap();
//! ```

use crate::console;
use crate::device::{DeviceError, DeviceId, DeviceTable, HartDescriptor};
use crate::hal::clock::Clock;
use crate::hal::dma::DmaController;
use crate::hal::uart::{Uart, UartError};
use crate::pmp::{self, PmpError};
use core::fmt;
use log::{LevelFilter, info};

/// Board bring-up errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlatformError {
    Device(DeviceError),
    Uart(UartError),
    /// Another logger was installed first.
    LoggerInstalled,
}

impl From<DeviceError> for PlatformError {
    fn from(err: DeviceError) -> Self {
        PlatformError::Device(err)
    }
}

impl From<UartError> for PlatformError {
    fn from(err: UartError) -> Self {
        PlatformError::Uart(err)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Device(err) => write!(f, "console lookup failed: {err}"),
            PlatformError::Uart(err) => write!(f, "console bring-up failed: {err}"),
            PlatformError::LoggerInstalled => f.write_str("a logger is already installed"),
        }
    }
}

/// Platform trait - implemented by each supported board
pub trait Platform {
    /// Board name for debugging
    fn name() -> &'static str;

    /// Id of the UART used as the console
    const CONSOLE_UART: DeviceId = 0;

    /// Log level installed by [`Platform::init_board`]
    const LOG_LEVEL: LevelFilter = LevelFilter::Info;

    /// Harts on this board with their PMP region counts
    fn harts() -> &'static [HartDescriptor];

    fn clocks() -> DeviceTable<Clock>;

    fn uarts() -> DeviceTable<dyn Uart>;

    fn dmas() -> DeviceTable<dyn DmaController>;

    /// Bring the console UART up at `baud_rate`.
    fn init_console(baud_rate: u32) -> Result<&'static dyn Uart, PlatformError> {
        let uart = Self::uarts().get(Self::CONSOLE_UART)?;
        uart.init(baud_rate)?;
        Ok(uart)
    }

    /// Bring up the console and route `log` output to it.
    fn init_board(baud_rate: u32) -> Result<&'static dyn Uart, PlatformError> {
        let uart = Self::init_console(baud_rate)?;
        console::init(uart, Self::LOG_LEVEL).map_err(|_| PlatformError::LoggerInstalled)?;
        info!("{}: console at {} baud", Self::name(), baud_rate);
        Ok(uart)
    }
}

// Board selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(all(feature = "freedom-nb2", feature = "freedom-e310"))] {
        compile_error!("Multiple boards selected! Choose only one: freedom-nb2 OR freedom-e310");
    } else if #[cfg(feature = "freedom-nb2")] {
        pub mod freedom_nb2;
        pub use freedom_nb2::FreedomNb2 as CurrentPlatform;
    } else if #[cfg(feature = "freedom-e310")] {
        pub mod freedom_e310;
        pub use freedom_e310::FreedomE310 as CurrentPlatform;
    } else {
        compile_error!(
            "No board selected!\n\
            Use: cargo build --features freedom-nb2\n\
            Or:  cargo build --no-default-features --features freedom-e310"
        );
    }
}

/// Look up a UART of the current board.
pub fn uart(id: DeviceId) -> Result<&'static dyn Uart, DeviceError> {
    CurrentPlatform::uarts().get(id)
}

/// Look up a clock of the current board.
pub fn clock(id: DeviceId) -> Result<&'static Clock, DeviceError> {
    CurrentPlatform::clocks().get(id)
}

/// Look up a DMA controller of the current board.
pub fn dma(id: DeviceId) -> Result<&'static dyn DmaController, DeviceError> {
    CurrentPlatform::dmas().get(id)
}

/// Number of PMP regions on `hart`.
pub fn region_count(hart: usize) -> Result<usize, PmpError> {
    pmp::region_count(CurrentPlatform::harts(), hart)
}

/// Bring up the current board's console and logger.
pub fn init_board(baud_rate: u32) -> Result<&'static dyn Uart, PlatformError> {
    CurrentPlatform::init_board(baud_rate)
}

/// PMP manager for the calling hart.
///
/// # Safety
///
/// Must run in M-mode, and the manager must stay on the calling hart.
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub unsafe fn pmp() -> pmp::Pmp<pmp::HartPmp> {
    pmp::Pmp::new(unsafe { pmp::HartPmp::new() }, CurrentPlatform::harts())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_board_tables_are_consistent() {
        assert!(!CurrentPlatform::name().is_empty());
        assert!(!CurrentPlatform::harts().is_empty());
        assert!(CurrentPlatform::uarts().len() > CurrentPlatform::CONSOLE_UART);

        for hart in CurrentPlatform::harts() {
            assert_eq!(region_count(hart.hart_id), Ok(hart.pmp_regions));
        }
    }

    #[test]
    fn lookups_past_the_table_fail() {
        let uarts = CurrentPlatform::uarts().len();
        let clocks = CurrentPlatform::clocks().len();

        assert_eq!(
            uart(uarts).err(),
            Some(DeviceError::OutOfRange { id: uarts, count: uarts })
        );
        assert_eq!(
            clock(clocks).err(),
            Some(DeviceError::OutOfRange { id: clocks, count: clocks })
        );
        assert_eq!(region_count(usize::MAX), Err(PmpError::UnknownHart { hart: usize::MAX }));
    }

    #[test]
    fn no_board_ships_a_dma_engine() {
        assert_eq!(
            dma(0).err(),
            Some(DeviceError::OutOfRange { id: 0, count: 0 })
        );
    }

    #[test]
    fn clock_names_are_unique() {
        let clocks = CurrentPlatform::clocks();
        for (i, a) in clocks.iter().enumerate() {
            assert!(clocks.iter().skip(i + 1).all(|b| b.name() != a.name()));
        }
    }
}
