//! UART Hardware Abstraction Layer.
//!
//! This module defines the capability table shared by every UART variant.

use core::fmt;

/// Line format: word length, stop bits and parity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineFormat {
    /// Number of data bits per frame.
    pub data_bits: DataBits,
    /// Number of stop bits.
    pub stop_bits: StopBits,
    /// Parity checking mode.
    pub parity: Parity,
}

impl LineFormat {
    /// 8 data bits, no parity, 1 stop bit.
    pub const EIGHT_N_ONE: Self = Self::new(DataBits::Eight, StopBits::One, Parity::None);

    pub const fn new(data_bits: DataBits, stop_bits: StopBits, parity: Parity) -> Self {
        Self {
            data_bits,
            stop_bits,
            parity,
        }
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::EIGHT_N_ONE
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    /// Convert a raw bit count. Anything outside 5..=8 is rejected.
    pub const fn from_count(bits: u8) -> Option<Self> {
        match bits {
            5 => Some(DataBits::Five),
            6 => Some(DataBits::Six),
            7 => Some(DataBits::Seven),
            8 => Some(DataBits::Eight),
            _ => None,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit.
    One,
    /// Two stop bits.
    Two,
}

impl StopBits {
    /// Convert a raw stop-bit count. Only 1 and 2 are recognized.
    pub const fn from_count(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(StopBits::One),
            2 => Some(StopBits::Two),
            _ => None,
        }
    }
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Pending interrupt cause as reported by the transceiver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartEvent {
    /// Nothing pending.
    None,
    /// Modem status changed.
    ModemStatus,
    /// Transmit holding register (or FIFO) drained to the watermark.
    TxEmpty,
    /// Receive data reached the watermark.
    RxDataAvailable,
    /// Receive line status error (overrun, parity, framing, break).
    RxLineStatus,
    /// Line control written while the transceiver was busy.
    BusyDetect,
    /// Receive FIFO holds data that has not been read for a while.
    CharacterTimeout,
    /// Cause code not recognized by the driver.
    Unknown(u8),
}

/// UART errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartError {
    /// Baud rate is zero or yields a divisor the hardware cannot hold.
    InvalidBaudRate(u32),
    /// Watermark level is not one of the levels the FIFO supports.
    InvalidWatermark(usize),
    /// No received data is waiting.
    NoData,
    /// The variant does not provide this operation.
    Unsupported,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::InvalidBaudRate(baud) => write!(f, "unsupported baud rate {baud}"),
            UartError::InvalidWatermark(level) => write!(f, "unsupported watermark level {level}"),
            UartError::NoData => f.write_str("no received data"),
            UartError::Unsupported => f.write_str("operation not supported by this UART"),
        }
    }
}

/// UART capability table.
///
/// Every UART variant implements this once. Optional capabilities have
/// default bodies returning [`UartError::Unsupported`]; callers should only
/// request what the variant advertises.
pub trait Uart: Sync {
    /// Bring the transceiver up at `baud_rate` with 8N1 framing.
    ///
    /// Registers the clock listeners on first call when the UART has a clock.
    ///
    /// # Panics
    ///
    /// Variants that poll for the transmitter to drain halt if it never does.
    fn init(&'static self, baud_rate: u32) -> Result<(), UartError>;

    /// Re-run bring-up with an explicit line format.
    ///
    /// Leaves clock listener registration to [`Uart::init`].
    fn reinit(&self, baud_rate: u32, format: LineFormat) -> Result<(), UartError>;

    /// Write one byte, spinning until the transmitter can take it.
    fn put_char(&self, byte: u8) -> Result<(), UartError>;

    /// Read one byte without blocking.
    ///
    /// Returns [`UartError::NoData`] when nothing has been received.
    fn get_char(&self) -> Result<u8, UartError>;

    /// Whether the transmitter can accept another byte right now.
    fn tx_ready(&self) -> bool;

    /// Last requested baud rate.
    fn baud_rate(&self) -> u32;

    /// Record `baud_rate` and reprogram the divisor from the current clock
    /// rate. Without a clock only the rate is recorded.
    fn set_baud_rate(&self, baud_rate: u32) -> Result<(), UartError>;

    /// Interrupt line wired to this UART, if any.
    fn interrupt_line(&self) -> Option<u32> {
        None
    }

    fn tx_interrupt_enable(&self) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    fn tx_interrupt_disable(&self) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    fn rx_interrupt_enable(&self) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    fn rx_interrupt_disable(&self) -> Result<(), UartError> {
        Err(UartError::Unsupported)
    }

    /// Set the transmit watermark. Unsupported levels leave the hardware
    /// untouched.
    fn set_tx_watermark(&self, level: usize) -> Result<(), UartError> {
        let _ = level;
        Err(UartError::Unsupported)
    }

    fn tx_watermark(&self) -> Result<usize, UartError> {
        Err(UartError::Unsupported)
    }

    /// Set the receive watermark. Unsupported levels leave the hardware
    /// untouched.
    fn set_rx_watermark(&self, level: usize) -> Result<(), UartError> {
        let _ = level;
        Err(UartError::Unsupported)
    }

    fn rx_watermark(&self) -> Result<usize, UartError> {
        Err(UartError::Unsupported)
    }

    /// Highest-priority pending event.
    fn event(&self) -> UartEvent {
        UartEvent::None
    }

    /// Write every byte of `bytes` (blocking).
    fn write(&self, bytes: &[u8]) -> Result<usize, UartError> {
        for &byte in bytes {
            self.put_char(byte)?;
        }
        Ok(bytes.len())
    }
}

/// Adapter implementing `core::fmt::Write` for any UART.
/// Line feeds are sent as CRLF.
pub struct UartWriter<'a>(pub &'a dyn Uart);

impl fmt::Write for UartWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.put_char(b'\r').map_err(|_| fmt::Error)?;
            }
            self.0.put_char(byte).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}
