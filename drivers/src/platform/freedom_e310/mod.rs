//! SiFive Freedom E310 board (HiFive1).
//!
//! Single hart. The UARTs run from `hfclk`; the always-on domain runs from
//! the low-frequency oscillator, which can be muxed to an external 32 kHz
//! crystal.

use super::Platform;
use crate::device::{DeviceTable, HartDescriptor, UartDescriptor};
use crate::hal::clock::Clock;
use crate::hal::dma::DmaController;
use crate::hal::uart::Uart;
use crate::peripheral::clock::{ExternalClock, Fe310LfRosc};
use crate::peripheral::sifive_uart0::SifiveUart0;

pub const HFCLK_HZ: u64 = 16_000_000;
pub const LFROSC_HZ: u64 = 1_500_000;
pub const LFALTCLK_HZ: u64 = 32_768;

pub const LFROSC_CONFIG: usize = 0x1000_0070;
pub const LFCLK_MUX: usize = 0x1000_007C;

pub const UART0_BASE: usize = 0x1001_3000;
pub const UART1_BASE: usize = 0x1002_3000;

pub const UART0_IRQ: u32 = 3;
pub const UART1_IRQ: u32 = 4;

pub struct FreedomE310;

static HARTS: [HartDescriptor; 1] = [HartDescriptor { hart_id: 0, pmp_regions: 8 }];

static HFCLK_SOURCE: ExternalClock = ExternalClock::new(HFCLK_HZ);
static HFCLK: Clock = Clock::new("hfclk", &HFCLK_SOURCE);

static LFROSC_INTERNAL: ExternalClock = ExternalClock::new(LFROSC_HZ);
static LFALTCLK: ExternalClock = ExternalClock::new(LFALTCLK_HZ);
static LFROSC: Fe310LfRosc =
    unsafe { Fe310LfRosc::new(LFROSC_CONFIG, LFCLK_MUX, &LFROSC_INTERNAL, &LFALTCLK) };
static LFCLK: Clock = Clock::new("lfclk", &LFROSC);

static UART0: SifiveUart0 = unsafe {
    SifiveUart0::new(UartDescriptor {
        base: UART0_BASE,
        clock: Some(&HFCLK),
        interrupt_line: Some(UART0_IRQ),
    })
};

static UART1: SifiveUart0 = unsafe {
    SifiveUart0::new(UartDescriptor {
        base: UART1_BASE,
        clock: Some(&HFCLK),
        interrupt_line: Some(UART1_IRQ),
    })
};

static CLOCKS: [&Clock; 2] = [&HFCLK, &LFCLK];
static UARTS: [&dyn Uart; 2] = [&UART0, &UART1];
static DMAS: [&dyn DmaController; 0] = [];

impl Platform for FreedomE310 {
    fn name() -> &'static str {
        "SiFive Freedom E310"
    }

    fn harts() -> &'static [HartDescriptor] {
        &HARTS
    }

    fn clocks() -> DeviceTable<Clock> {
        DeviceTable::new(&CLOCKS)
    }

    fn uarts() -> DeviceTable<dyn Uart> {
        DeviceTable::new(&UARTS)
    }

    fn dmas() -> DeviceTable<dyn DmaController> {
        DeviceTable::new(&DMAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hart_with_eight_regions() {
        assert_eq!(FreedomE310::harts(), &[HartDescriptor { hart_id: 0, pmp_regions: 8 }]);
    }

    #[test]
    fn clock_table_order() {
        let clocks = FreedomE310::clocks();

        assert_eq!(clocks.get(0).unwrap().name(), "hfclk");
        assert_eq!(clocks.get(1).unwrap().name(), "lfclk");
        assert_eq!(clocks.get(0).unwrap().rate_hz(), HFCLK_HZ);
    }
}
