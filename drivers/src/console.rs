//! UART-backed console and `log` backend.

use crate::hal::uart::{Uart, UartWriter};
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Once;

/// `log` backend writing one CRLF-terminated line per record.
pub struct UartLogger {
    uart: &'static dyn Uart,
    level: LevelFilter,
}

impl UartLogger {
    pub const fn new(uart: &'static dyn Uart, level: LevelFilter) -> Self {
        Self { uart, level }
    }
}

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            UartWriter(self.uart),
            "[{:<5}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: Once<UartLogger> = Once::new();

/// Route `log` output to `uart`. Call once, after the UART is up.
pub fn init(uart: &'static dyn Uart, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.call_once(|| UartLogger::new(uart, level));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Write to the console UART, if one has been installed.
pub fn console_write_fmt(args: fmt::Arguments) {
    if let Some(logger) = LOGGER.get() {
        let _ = UartWriter(logger.uart).write_fmt(args);
    }
}

// ============================================================================
// Print Macros
// ============================================================================

/// Print to console without newline
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {
        $crate::console::console_write_fmt(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kprintln {
    () => { $crate::kprint!("\n") };
    ($($arg:tt)*) => {{
        $crate::kprint!($($arg)*);
        $crate::kprint!("\n");
    }};
}
