//! SiFive NB2 UART (DesignWare 16550-compatible) Driver
//!
//! # Features
//!
//! - Baud divisor rounded to nearest, re-applied when the input clock changes
//! - 5/6/7/8 data bits, 1/2 stop bits, none/odd/even parity
//! - 256-byte FIFOs with discrete watermark levels
//! - Blocking transmit, non-blocking receive
//!
//! The FIFO control register is write-only on this IP, so the driver keeps a
//! shadow copy and the watermark getters decode the shadow.

use crate::device::UartDescriptor;
use crate::hal::clock::{Clock, PostRateChange, PreRateChange};
use crate::hal::mmio::{Mmio, RegisterIo};
use crate::hal::uart::{DataBits, LineFormat, Parity, StopBits, Uart, UartError, UartEvent};
use bitflags::bitflags;
use common::math::div_round_closest;
use log::{debug, trace, warn};
use spin::Mutex;

/// Depth of each FIFO in bytes.
pub const FIFO_SIZE: usize = 256;

/// Transmitter-empty polls allowed during bring-up before giving up.
pub const MAX_POLLS: u32 = 10_000;

const FIFO_QUARTER: usize = FIFO_SIZE / 4;
const FIFO_HALF: usize = FIFO_SIZE / 2;
const FIFO_ALMOST_FULL: usize = FIFO_SIZE - 2;

const TX_TRIGGER_SHIFT: u32 = 4;
const RX_TRIGGER_SHIFT: u32 = 6;

/// Register offsets.
pub mod regs {
    pub const RBR: usize = 0x00;
    pub const THR: usize = 0x00;
    pub const DLL: usize = 0x00;
    pub const IER: usize = 0x04;
    pub const DLH: usize = 0x04;
    pub const IIR: usize = 0x08;
    pub const FCR: usize = 0x08;
    pub const LCR: usize = 0x0C;
    pub const MCR: usize = 0x10;
    pub const LSR: usize = 0x14;
    pub const USR: usize = 0x7C;
    pub const CPR: usize = 0xF4;
}

bitflags! {
    /// Line Status Register (LSR).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LineStatus: u32 {
        const DATA_READY = 1 << 0;
        const THR_EMPTY = 1 << 5;
        const TX_EMPTY = 1 << 6;
    }

    /// Interrupt Enable Register (IER).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct InterruptEnable: u32 {
        const RX_DATA = 1 << 0;
        const TX_EMPTY = 1 << 1;
    }

    /// Line Control Register (LCR).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LineControl: u32 {
        const WORD_LENGTH = 0b11;
        const TWO_STOP_BITS = 1 << 2;
        const PARITY_ENABLE = 1 << 3;
        const EVEN_PARITY = 1 << 4;
        const DLAB = 1 << 7;
    }

    /// FIFO Control Register (FCR).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FifoControl: u32 {
        const ENABLE = 1 << 0;
        const RX_RESET = 1 << 1;
        const TX_RESET = 1 << 2;
        const TX_TRIGGER = 0b11 << TX_TRIGGER_SHIFT;
        const RX_TRIGGER = 0b11 << RX_TRIGGER_SHIFT;
    }

    /// UART Status Register (USR).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct UartStatus: u32 {
        const TX_NOT_FULL = 1 << 1;
    }
}

/// 8 data bits, no parity, 1 stop bit.
const LCR_8N1: u32 = 0b11;

/// Compute the 16x-oversampling divisor for `baud_rate`.
///
/// Rounds to nearest to keep the sampling error small. Fails if the rate is
/// zero or the divisor does not fit DLL/DLH.
pub fn baud_divisor(clock_hz: u64, baud_rate: u32) -> Result<u16, UartError> {
    if baud_rate == 0 {
        return Err(UartError::InvalidBaudRate(baud_rate));
    }
    let divisor = div_round_closest(clock_hz, 16 * baud_rate as u64);
    match u16::try_from(divisor) {
        Ok(divisor) if divisor != 0 => Ok(divisor),
        _ => Err(UartError::InvalidBaudRate(baud_rate)),
    }
}

const fn tx_trigger(level: usize) -> Option<u32> {
    match level {
        0 => Some(0),
        2 => Some(1),
        FIFO_QUARTER => Some(2),
        FIFO_HALF => Some(3),
        _ => None,
    }
}

const fn rx_trigger(level: usize) -> Option<u32> {
    match level {
        1 => Some(0),
        FIFO_QUARTER => Some(1),
        FIFO_HALF => Some(2),
        FIFO_ALMOST_FULL => Some(3),
        _ => None,
    }
}

const TX_LEVELS: [usize; 4] = [0, 2, FIFO_QUARTER, FIFO_HALF];
const RX_LEVELS: [usize; 4] = [1, FIFO_QUARTER, FIFO_HALF, FIFO_ALMOST_FULL];

struct UartState {
    baud_rate: u32,
    divisor: u16,
    /// Shadow of the write-only FCR, without the self-clearing reset bits.
    fcr: u32,
    listening: bool,
}

/// NB2 UART driver.
pub struct Nb2Uart0<R: RegisterIo = Mmio> {
    regs: R,
    clock: Option<&'static Clock>,
    interrupt_line: Option<u32>,
    state: Mutex<UartState>,
}

impl Nb2Uart0<Mmio> {
    /// Create a driver for the UART described by `desc`.
    ///
    /// # Safety
    ///
    /// - `desc.base` must point to an NB2 UART register block
    /// - Only one driver should exist per UART instance
    pub const unsafe fn new(desc: UartDescriptor) -> Self {
        Self::with_registers(
            unsafe { Mmio::new(desc.base) },
            desc.clock,
            desc.interrupt_line,
        )
    }
}

impl<R: RegisterIo> Nb2Uart0<R> {
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
                fcr: 0,
                listening: false,
            }),
        }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Divisor currently programmed into DLL/DLH.
    pub fn divisor(&self) -> u16 {
        self.state.lock().divisor
    }

    /// Whether the FIFOs are enabled, per IIR[7:6].
    pub fn fifo_access_enabled(&self) -> bool {
        (self.regs.read32(regs::IIR) >> 6) & 0b11 == 0b11
    }

    fn line_status(&self) -> LineStatus {
        LineStatus::from_bits_truncate(self.regs.read32(regs::LSR))
    }

    /// Spin until the transmitter has fully drained.
    ///
    /// # Panics
    ///
    /// After [`MAX_POLLS`] polls; there is no way to bring the UART up.
    fn wait_transmitter_empty(&self, during: &str) {
        for _ in 0..=MAX_POLLS {
            if self.line_status().contains(LineStatus::TX_EMPTY) {
                return;
            }
            core::hint::spin_loop();
        }
        panic!("nb2uart0: transmitter never drained during {during}");
    }

    /// Reset framing to 8N1 and enable and flush the FIFOs when present.
    fn setup_line_and_fifo(&self) {
        self.regs.write32(regs::LCR, LCR_8N1);

        // CPR reads zero when the FIFO parameters are not synthesized.
        if self.regs.read32(regs::CPR) != 0 {
            let mut state = self.state.lock();
            state.fcr |= FifoControl::ENABLE.bits();
            self.regs.write32(
                regs::FCR,
                state.fcr | (FifoControl::RX_RESET | FifoControl::TX_RESET).bits(),
            );
        }
    }

    fn apply_format(&self, format: LineFormat) {
        let word_length = match format.data_bits {
            DataBits::Five => 0b00,
            DataBits::Six => 0b01,
            DataBits::Seven => 0b10,
            DataBits::Eight => 0b11,
        };
        self.regs
            .modify32(regs::LCR, LineControl::WORD_LENGTH.bits(), word_length);

        match format.stop_bits {
            StopBits::One => self
                .regs
                .clear_bits32(regs::LCR, LineControl::TWO_STOP_BITS.bits()),
            StopBits::Two => self
                .regs
                .set_bits32(regs::LCR, LineControl::TWO_STOP_BITS.bits()),
        }

        match format.parity {
            Parity::None => self
                .regs
                .clear_bits32(regs::LCR, LineControl::PARITY_ENABLE.bits()),
            Parity::Odd => {
                self.regs
                    .set_bits32(regs::LCR, LineControl::PARITY_ENABLE.bits());
                self.regs
                    .clear_bits32(regs::LCR, LineControl::EVEN_PARITY.bits());
            }
            Parity::Even => self.regs.set_bits32(
                regs::LCR,
                (LineControl::PARITY_ENABLE | LineControl::EVEN_PARITY).bits(),
            ),
        }
    }

    fn set_trigger(&self, mask: FifoControl, shift: u32, code: u32) {
        let mut state = self.state.lock();
        state.fcr = (state.fcr & !mask.bits()) | (code << shift);
        self.regs.write32(regs::FCR, state.fcr);
    }

    fn trigger(&self, shift: u32) -> usize {
        (self.state.lock().fcr >> shift) as usize & 0b11
    }
}

impl<R: RegisterIo + 'static> Nb2Uart0<R> {
    fn register_clock_listeners(&'static self) {
        let Some(clock) = self.clock else {
            return;
        };

        let mut state = self.state.lock();
        if !state.listening {
            clock.register_pre_change(self);
            clock.register_post_change(self);
            state.listening = true;
        }
    }
}

impl<R: RegisterIo + 'static> Uart for Nb2Uart0<R> {
    fn init(&'static self, baud_rate: u32) -> Result<(), UartError> {
        self.register_clock_listeners();
        self.wait_transmitter_empty("init");
        self.set_baud_rate(baud_rate)?;
        self.setup_line_and_fifo();

        debug!(
            "nb2uart0: up at {} baud (divisor {})",
            baud_rate,
            self.divisor()
        );
        Ok(())
    }

    fn reinit(&self, baud_rate: u32, format: LineFormat) -> Result<(), UartError> {
        self.set_baud_rate(baud_rate)?;
        self.wait_transmitter_empty("reinit");
        self.setup_line_and_fifo();
        self.apply_format(format);

        debug!("nb2uart0: reconfigured {} baud {:?}", baud_rate, format);
        Ok(())
    }

    fn put_char(&self, byte: u8) -> Result<(), UartError> {
        while !self.line_status().contains(LineStatus::THR_EMPTY) {
            core::hint::spin_loop();
        }
        self.regs.write32(regs::THR, byte as u32);
        Ok(())
    }

    fn get_char(&self) -> Result<u8, UartError> {
        if !self.line_status().contains(LineStatus::DATA_READY) {
            return Err(UartError::NoData);
        }
        Ok((self.regs.read32(regs::RBR) & 0xFF) as u8)
    }

    fn tx_ready(&self) -> bool {
        UartStatus::from_bits_truncate(self.regs.read32(regs::USR))
            .contains(UartStatus::TX_NOT_FULL)
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

        self.regs.set_bits32(regs::LCR, LineControl::DLAB.bits());
        self.regs.write32(regs::DLL, (divisor & 0xFF) as u32);
        self.regs.write32(regs::DLH, (divisor >> 8) as u32);
        self.regs.clear_bits32(regs::LCR, LineControl::DLAB.bits());
        Ok(())
    }

    fn interrupt_line(&self) -> Option<u32> {
        self.interrupt_line
    }

    fn tx_interrupt_enable(&self) -> Result<(), UartError> {
        self.regs
            .set_bits32(regs::IER, InterruptEnable::TX_EMPTY.bits());
        Ok(())
    }

    fn tx_interrupt_disable(&self) -> Result<(), UartError> {
        self.regs
            .clear_bits32(regs::IER, InterruptEnable::TX_EMPTY.bits());
        Ok(())
    }

    fn rx_interrupt_enable(&self) -> Result<(), UartError> {
        self.regs.set_bits32(regs::IER, InterruptEnable::RX_DATA.bits());
        Ok(())
    }

    fn rx_interrupt_disable(&self) -> Result<(), UartError> {
        self.regs
            .clear_bits32(regs::IER, InterruptEnable::RX_DATA.bits());
        Ok(())
    }

    fn set_tx_watermark(&self, level: usize) -> Result<(), UartError> {
        let code = tx_trigger(level).ok_or(UartError::InvalidWatermark(level))?;
        self.set_trigger(FifoControl::TX_TRIGGER, TX_TRIGGER_SHIFT, code);
        Ok(())
    }

    fn tx_watermark(&self) -> Result<usize, UartError> {
        Ok(TX_LEVELS[self.trigger(TX_TRIGGER_SHIFT)])
    }

    fn set_rx_watermark(&self, level: usize) -> Result<(), UartError> {
        let code = rx_trigger(level).ok_or(UartError::InvalidWatermark(level))?;
        self.set_trigger(FifoControl::RX_TRIGGER, RX_TRIGGER_SHIFT, code);
        Ok(())
    }

    fn rx_watermark(&self) -> Result<usize, UartError> {
        Ok(RX_LEVELS[self.trigger(RX_TRIGGER_SHIFT)])
    }

    fn event(&self) -> UartEvent {
        match (self.regs.read32(regs::IIR) & 0xF) as u8 {
            0x0 => UartEvent::ModemStatus,
            0x1 => UartEvent::None,
            0x2 => UartEvent::TxEmpty,
            0x4 => UartEvent::RxDataAvailable,
            0x6 => UartEvent::RxLineStatus,
            0x7 => UartEvent::BusyDetect,
            0xC => UartEvent::CharacterTimeout,
            other => UartEvent::Unknown(other),
        }
    }
}

impl<R: RegisterIo + 'static> PreRateChange for Nb2Uart0<R> {
    fn pre_rate_change(&self, clock: &Clock) {
        trace!("nb2uart0: {} about to change rate", clock.name());
    }
}

impl<R: RegisterIo + 'static> PostRateChange for Nb2Uart0<R> {
    fn post_rate_change(&self, clock: &Clock) {
        let baud_rate = self.baud_rate();
        if let Err(err) = self.set_baud_rate(baud_rate) {
            warn!(
                "nb2uart0: cannot keep {} baud on {} at {} Hz: {}",
                baud_rate,
                clock.name(),
                clock.rate_hz(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::clock::ExternalClock;
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;

    /// Register-level model of the DesignWare UART, including the DLAB
    /// banking of offsets 0x00 and 0x04.
    struct DwModel {
        lcr: u32,
        dll: u32,
        dlh: u32,
        ier: u32,
        iir: u32,
        lsr: u32,
        usr: u32,
        cpr: u32,
        fcr_writes: Vec<u32>,
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl Default for DwModel {
        fn default() -> Self {
            Self {
                lcr: 0,
                dll: 0,
                dlh: 0,
                ier: 0,
                iir: 0x01,
                lsr: (LineStatus::THR_EMPTY | LineStatus::TX_EMPTY).bits(),
                usr: UartStatus::TX_NOT_FULL.bits(),
                cpr: 0x0003_0000,
                fcr_writes: Vec::new(),
                rx: VecDeque::new(),
                tx: Vec::new(),
            }
        }
    }

    struct FakeDw(Mutex<DwModel>);

    impl RegisterIo for FakeDw {
        fn read32(&self, offset: usize) -> u32 {
            let mut m = self.0.lock();
            let dlab = m.lcr & LineControl::DLAB.bits() != 0;
            match offset {
                regs::RBR if dlab => m.dll,
                regs::RBR => m.rx.pop_front().map_or(0, u32::from),
                regs::IER if dlab => m.dlh,
                regs::IER => m.ier,
                regs::IIR => m.iir,
                regs::LCR => m.lcr,
                regs::LSR if !m.rx.is_empty() => m.lsr | LineStatus::DATA_READY.bits(),
                regs::LSR => m.lsr,
                regs::USR => m.usr,
                regs::CPR => m.cpr,
                _ => 0,
            }
        }

        fn write32(&self, offset: usize, value: u32) {
            let mut m = self.0.lock();
            let dlab = m.lcr & LineControl::DLAB.bits() != 0;
            match offset {
                regs::DLL if dlab => m.dll = value,
                regs::THR => m.tx.push(value as u8),
                regs::DLH if dlab => m.dlh = value,
                regs::IER => m.ier = value,
                regs::FCR => m.fcr_writes.push(value),
                regs::LCR => m.lcr = value,
                _ => {}
            }
        }
    }

    fn leak<T>(value: T) -> &'static T {
        Box::leak(Box::new(value))
    }

    fn clock_at(rate_hz: u64) -> &'static Clock {
        leak(Clock::new("hfclk", leak(ExternalClock::new(rate_hz))))
    }

    fn uart_with(model: DwModel, clock: Option<&'static Clock>) -> &'static Nb2Uart0<FakeDw> {
        leak(Nb2Uart0::with_registers(
            FakeDw(Mutex::new(model)),
            clock,
            Some(3),
        ))
    }

    fn uart(clock: Option<&'static Clock>) -> &'static Nb2Uart0<FakeDw> {
        uart_with(DwModel::default(), clock)
    }

    #[test]
    fn divisor_rounds_to_nearest() {
        assert_eq!(baud_divisor(16_000_000, 115_200), Ok(9));
        assert_eq!(baud_divisor(16_000_000, 115_200), baud_divisor(16_000_000, 115_200));
        assert_eq!(baud_divisor(32_000_000, 115_200), Ok(17));
        assert_eq!(baud_divisor(1_843_200, 9_600), Ok(12));
    }

    #[test]
    fn divisor_rejects_unusable_rates() {
        assert_eq!(baud_divisor(16_000_000, 0), Err(UartError::InvalidBaudRate(0)));
        assert_eq!(baud_divisor(1_000_000_000, 1), Err(UartError::InvalidBaudRate(1)));
        assert_eq!(baud_divisor(1_000, 115_200), Err(UartError::InvalidBaudRate(115_200)));
        assert_eq!(
            baud_divisor(u64::MAX, 115_200),
            Err(UartError::InvalidBaudRate(115_200))
        );
    }

    #[test]
    fn divisor_survives_a_rate_change_to_the_top_of_the_range() {
        let clock = clock_at(16_000_000);
        let uart = uart(Some(clock));
        uart.init(115_200).unwrap();

        assert_eq!(clock.request_rate_change(u64::MAX), u64::MAX);

        assert_eq!(uart.divisor(), 9);
        assert_eq!(uart.baud_rate(), 115_200);
    }

    #[test]
    fn init_programs_divisor_framing_and_fifo() {
        let uart = uart(Some(clock_at(16_000_000)));

        uart.init(115_200).unwrap();

        let m = uart.regs.0.lock();
        assert_eq!((m.dlh << 8) | m.dll, 9);
        assert_eq!(m.lcr, LCR_8N1);
        let expected_fcr =
            (FifoControl::ENABLE | FifoControl::RX_RESET | FifoControl::TX_RESET).bits();
        assert_eq!(m.fcr_writes.as_slice(), &[expected_fcr]);
        drop(m);

        assert_eq!(uart.baud_rate(), 115_200);
        assert_eq!(uart.divisor(), 9);
    }

    #[test]
    fn init_leaves_fifo_alone_without_parameters() {
        let uart = uart_with(
            DwModel {
                cpr: 0,
                ..DwModel::default()
            },
            Some(clock_at(16_000_000)),
        );

        uart.init(115_200).unwrap();

        assert!(uart.regs.0.lock().fcr_writes.is_empty());
    }

    #[test]
    fn init_registers_clock_listeners_once() {
        let clock = clock_at(16_000_000);
        let uart = uart(Some(clock));

        uart.init(115_200).unwrap();
        uart.init(115_200).unwrap();

        assert_eq!(clock.listener_counts(), (1, 1));
    }

    #[test]
    #[should_panic(expected = "never drained")]
    fn init_halts_when_transmitter_never_drains() {
        let uart = uart_with(
            DwModel {
                lsr: LineStatus::THR_EMPTY.bits(),
                ..DwModel::default()
            },
            None,
        );

        let _ = uart.init(115_200);
    }

    #[test]
    fn baud_rate_without_clock_is_only_recorded() {
        let uart = uart(None);

        uart.init(57_600).unwrap();

        assert_eq!(uart.baud_rate(), 57_600);
        assert_eq!(uart.divisor(), 0);
        assert_eq!(uart.regs.0.lock().dll, 0);
    }

    #[test]
    fn failed_baud_change_keeps_previous_setting() {
        let uart = uart(Some(clock_at(16_000_000)));
        uart.init(115_200).unwrap();

        assert_eq!(uart.set_baud_rate(0), Err(UartError::InvalidBaudRate(0)));
        assert_eq!(
            uart.set_baud_rate(4_000_000),
            Err(UartError::InvalidBaudRate(4_000_000))
        );
        assert_eq!(uart.baud_rate(), 115_200);
        assert_eq!(uart.divisor(), 9);
    }

    #[test]
    fn tx_watermark_accepts_only_hardware_levels() {
        let uart = uart(None);

        for level in [0, 2, 64, 128] {
            uart.set_tx_watermark(level).unwrap();
            assert_eq!(uart.tx_watermark(), Ok(level));
        }

        let writes = uart.regs.0.lock().fcr_writes.len();
        assert_eq!(uart.set_tx_watermark(3), Err(UartError::InvalidWatermark(3)));
        assert_eq!(uart.set_tx_watermark(256), Err(UartError::InvalidWatermark(256)));
        assert_eq!(uart.tx_watermark(), Ok(128));
        assert_eq!(uart.regs.0.lock().fcr_writes.len(), writes);
    }

    #[test]
    fn rx_watermark_accepts_only_hardware_levels() {
        let uart = uart(None);

        for level in [1, 64, 128, 254] {
            uart.set_rx_watermark(level).unwrap();
            assert_eq!(uart.rx_watermark(), Ok(level));
        }

        assert_eq!(uart.set_rx_watermark(0), Err(UartError::InvalidWatermark(0)));
        assert_eq!(uart.set_rx_watermark(255), Err(UartError::InvalidWatermark(255)));
        assert_eq!(uart.rx_watermark(), Ok(254));
    }

    #[test]
    fn watermarks_share_fcr_without_clobbering() {
        let uart = uart(None);

        uart.set_tx_watermark(64).unwrap();
        uart.set_rx_watermark(254).unwrap();

        assert_eq!(uart.tx_watermark(), Ok(64));
        let last = *uart.regs.0.lock().fcr_writes.last().unwrap();
        assert_eq!(last, (2 << TX_TRIGGER_SHIFT) | (3 << RX_TRIGGER_SHIFT));
    }

    #[test]
    fn get_char_does_not_block() {
        let uart = uart(None);

        assert_eq!(uart.get_char(), Err(UartError::NoData));

        uart.regs.0.lock().rx.push_back(b'k');
        assert_eq!(uart.get_char(), Ok(b'k'));
        assert_eq!(uart.get_char(), Err(UartError::NoData));
    }

    #[test]
    fn put_char_writes_holding_register() {
        let uart = uart(None);

        uart.write(b"ok").unwrap();

        assert_eq!(uart.regs.0.lock().tx.as_slice(), b"ok");
    }

    #[test]
    fn reinit_applies_line_format_fields() {
        let uart = uart(Some(clock_at(16_000_000)));

        uart.reinit(
            9_600,
            LineFormat::new(DataBits::Seven, StopBits::Two, Parity::Even),
        )
        .unwrap();
        assert_eq!(uart.regs.0.lock().lcr, 0b1_1110);

        uart.reinit(
            9_600,
            LineFormat::new(DataBits::Five, StopBits::One, Parity::Odd),
        )
        .unwrap();
        assert_eq!(uart.regs.0.lock().lcr, 0b0_1000);

        uart.reinit(9_600, LineFormat::EIGHT_N_ONE).unwrap();
        assert_eq!(uart.regs.0.lock().lcr, LCR_8N1);
        assert_eq!(uart.divisor(), 104);
    }

    #[test]
    fn reinit_works_on_a_borrowed_uart() {
        let clock = clock_at(16_000_000);
        let uart = Nb2Uart0::with_registers(
            FakeDw(Mutex::new(DwModel::default())),
            Some(clock),
            None,
        );

        uart.reinit(
            19_200,
            LineFormat::new(DataBits::Eight, StopBits::Two, Parity::None),
        )
        .unwrap();

        assert_eq!(uart.divisor(), 52);
        assert_eq!(uart.regs.0.lock().lcr, LCR_8N1 | LineControl::TWO_STOP_BITS.bits());
        assert_eq!(clock.listener_counts(), (0, 0));
    }

    #[test]
    fn interrupt_enables_touch_their_own_bits() {
        let uart = uart(None);

        uart.rx_interrupt_enable().unwrap();
        uart.tx_interrupt_enable().unwrap();
        assert_eq!(uart.regs.0.lock().ier, 0b11);

        uart.rx_interrupt_disable().unwrap();
        assert_eq!(uart.regs.0.lock().ier, InterruptEnable::TX_EMPTY.bits());
        uart.tx_interrupt_disable().unwrap();
        assert_eq!(uart.regs.0.lock().ier, 0);
        assert_eq!(uart.interrupt_line(), Some(3));
    }

    #[test]
    fn status_decoding() {
        let uart = uart(None);
        assert!(uart.tx_ready());
        assert_eq!(uart.event(), UartEvent::None);
        assert!(!uart.fifo_access_enabled());

        {
            let mut m = uart.regs.0.lock();
            m.iir = 0xC4;
            m.usr = 0;
        }
        assert_eq!(uart.event(), UartEvent::RxDataAvailable);
        assert!(uart.fifo_access_enabled());
        assert!(!uart.tx_ready());

        uart.regs.0.lock().iir = 0x0C;
        assert_eq!(uart.event(), UartEvent::CharacterTimeout);
        uart.regs.0.lock().iir = 0x0B;
        assert_eq!(uart.event(), UartEvent::Unknown(0xB));
    }
}
