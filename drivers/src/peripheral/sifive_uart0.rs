//! SiFive UART0 Driver
//!
//! The UART on FE310-class parts: 8-entry FIFOs, a single divisor register
//! and no parity or word-length control. Framing is always 8 data bits with
//! no parity; only the stop-bit count is configurable.

use crate::device::UartDescriptor;
use crate::hal::clock::{Clock, PostRateChange};
use crate::hal::mmio::{Mmio, RegisterIo};
use crate::hal::uart::{DataBits, LineFormat, Parity, StopBits, Uart, UartError, UartEvent};
use common::math::div_round_closest;
use log::{debug, warn};
use spin::Mutex;

/// Register offsets.
pub mod regs {
    pub const TXDATA: usize = 0x00;
    pub const RXDATA: usize = 0x04;
    pub const TXCTRL: usize = 0x08;
    pub const RXCTRL: usize = 0x0C;
    pub const IE: usize = 0x10;
    pub const IP: usize = 0x14;
    pub const DIV: usize = 0x18;
}

const TXDATA_FULL: u32 = 1 << 31;
const RXDATA_EMPTY: u32 = 1 << 31;
const CTRL_ENABLE: u32 = 1 << 0;
const TXCTRL_NSTOP: u32 = 1 << 1;
const CTRL_CNT_SHIFT: u32 = 16;
const CTRL_CNT_MASK: u32 = 0b111 << CTRL_CNT_SHIFT;
const IRQ_TXWM: u32 = 1 << 0;
const IRQ_RXWM: u32 = 1 << 1;

/// Highest watermark level; the FIFOs hold eight entries.
pub const MAX_WATERMARK: usize = 7;

/// Compute the value of the `div` register for `baud_rate`.
pub fn baud_divisor(clock_hz: u64, baud_rate: u32) -> Result<u16, UartError> {
    if baud_rate == 0 {
        return Err(UartError::InvalidBaudRate(baud_rate));
    }
    match div_round_closest(clock_hz, baud_rate as u64).checked_sub(1) {
        Some(div) => u16::try_from(div).map_err(|_| UartError::InvalidBaudRate(baud_rate)),
        None => Err(UartError::InvalidBaudRate(baud_rate)),
    }
}

struct UartState {
    baud_rate: u32,
    divisor: u16,
    listening: bool,
}

/// SiFive UART0 driver.
pub struct SifiveUart0<R: RegisterIo = Mmio> {
    regs: R,
    clock: Option<&'static Clock>,
    interrupt_line: Option<u32>,
    state: Mutex<UartState>,
}

impl SifiveUart0<Mmio> {
    /// # Safety
    ///
    /// `desc.base` must point to a SiFive UART0 register block owned by this
    /// driver alone.
    pub const unsafe fn new(desc: UartDescriptor) -> Self {
        Self::with_registers(
            unsafe { Mmio::new(desc.base) },
            desc.clock,
            desc.interrupt_line,
        )
    }
}

impl<R: RegisterIo> SifiveUart0<R> {
    pub const fn with_registers(
        regs: R,
        clock: Option<&'static Clock>,
        interrupt_line: Option<u32>,
    ) -> Self {
        Self {
            regs,
            clock,
            interrupt_line,
            state: Mutex::new(UartState {
                baud_rate: 0,
                divisor: 0,
                listening: false,
            }),
        }
    }

    pub fn divisor(&self) -> u16 {
        self.state.lock().divisor
    }

    fn enable(&self, stop_bits: StopBits) {
        self.regs.set_bits32(regs::TXCTRL, CTRL_ENABLE);
        match stop_bits {
            StopBits::One => self.regs.clear_bits32(regs::TXCTRL, TXCTRL_NSTOP),
            StopBits::Two => self.regs.set_bits32(regs::TXCTRL, TXCTRL_NSTOP),
        }
        self.regs.set_bits32(regs::RXCTRL, CTRL_ENABLE);
    }

    fn set_count(&self, offset: usize, level: usize) -> Result<(), UartError> {
        if level > MAX_WATERMARK {
            return Err(UartError::InvalidWatermark(level));
        }
        self.regs
            .modify32(offset, CTRL_CNT_MASK, (level as u32) << CTRL_CNT_SHIFT);
        Ok(())
    }

    fn count(&self, offset: usize) -> usize {
        ((self.regs.read32(offset) & CTRL_CNT_MASK) >> CTRL_CNT_SHIFT) as usize
    }
}

impl<R: RegisterIo + 'static> SifiveUart0<R> {
    fn register_clock_listener(&'static self) {
        if let Some(clock) = self.clock {
            let mut state = self.state.lock();
            if !state.listening {
                clock.register_post_change(self);
                state.listening = true;
            }
        }
    }
}

impl<R: RegisterIo + 'static> Uart for SifiveUart0<R> {
    fn init(&'static self, baud_rate: u32) -> Result<(), UartError> {
        self.register_clock_listener();
        self.reinit(baud_rate, LineFormat::EIGHT_N_ONE)
    }

    fn reinit(&self, baud_rate: u32, format: LineFormat) -> Result<(), UartError> {
        if format.data_bits != DataBits::Eight || format.parity != Parity::None {
            return Err(UartError::Unsupported);
        }

        self.set_baud_rate(baud_rate)?;
        self.enable(format.stop_bits);

        debug!(
            "sifive_uart0: up at {} baud (div {})",
            baud_rate,
            self.divisor()
        );
        Ok(())
    }

    fn put_char(&self, byte: u8) -> Result<(), UartError> {
        while !self.tx_ready() {
            core::hint::spin_loop();
        }
        self.regs.write32(regs::TXDATA, byte as u32);
        Ok(())
    }

    fn get_char(&self) -> Result<u8, UartError> {
        // Reading pops the FIFO, so sample once.
        let rxdata = self.regs.read32(regs::RXDATA);
        if rxdata & RXDATA_EMPTY != 0 {
            return Err(UartError::NoData);
        }
        Ok((rxdata & 0xFF) as u8)
    }

    fn tx_ready(&self) -> bool {
        self.regs.read32(regs::TXDATA) & TXDATA_FULL == 0
    }

    fn baud_rate(&self) -> u32 {
        self.state.lock().baud_rate
    }

    fn set_baud_rate(&self, baud_rate: u32) -> Result<(), UartError> {
        if baud_rate == 0 {
            return Err(UartError::InvalidBaudRate(baud_rate));
        }

        let Some(clock) = self.clock else {
            self.state.lock().baud_rate = baud_rate;
            return Ok(());
        };

        let divisor = baud_divisor(clock.rate_hz(), baud_rate)?;
        let mut state = self.state.lock();
        state.baud_rate = baud_rate;
        state.divisor = divisor;
        self.regs.write32(regs::DIV, divisor as u32);
        Ok(())
    }

    fn interrupt_line(&self) -> Option<u32> {
        self.interrupt_line
    }

    fn tx_interrupt_enable(&self) -> Result<(), UartError> {
        self.regs.set_bits32(regs::IE, IRQ_TXWM);
        Ok(())
    }

    fn tx_interrupt_disable(&self) -> Result<(), UartError> {
        self.regs.clear_bits32(regs::IE, IRQ_TXWM);
        Ok(())
    }

    fn rx_interrupt_enable(&self) -> Result<(), UartError> {
        self.regs.set_bits32(regs::IE, IRQ_RXWM);
        Ok(())
    }

    fn rx_interrupt_disable(&self) -> Result<(), UartError> {
        self.regs.clear_bits32(regs::IE, IRQ_RXWM);
        Ok(())
    }

    fn set_tx_watermark(&self, level: usize) -> Result<(), UartError> {
        self.set_count(regs::TXCTRL, level)
    }

    fn tx_watermark(&self) -> Result<usize, UartError> {
        Ok(self.count(regs::TXCTRL))
    }

    fn set_rx_watermark(&self, level: usize) -> Result<(), UartError> {
        self.set_count(regs::RXCTRL, level)
    }

    fn rx_watermark(&self) -> Result<usize, UartError> {
        Ok(self.count(regs::RXCTRL))
    }

    fn event(&self) -> UartEvent {
        let pending = self.regs.read32(regs::IP);
        if pending & IRQ_RXWM != 0 {
            UartEvent::RxDataAvailable
        } else if pending & IRQ_TXWM != 0 {
            UartEvent::TxEmpty
        } else {
            UartEvent::None
        }
    }
}

impl<R: RegisterIo + 'static> PostRateChange for SifiveUart0<R> {
    fn post_rate_change(&self, clock: &Clock) {
        let baud_rate = self.baud_rate();
        if let Err(err) = self.set_baud_rate(baud_rate) {
            warn!(
                "sifive_uart0: cannot keep {} baud on {} at {} Hz: {}",
                baud_rate,
                clock.name(),
                clock.rate_hz(),
                err
            );
        }
    }
}
