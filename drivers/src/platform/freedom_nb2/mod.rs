//! SiFive Freedom NB2 board.
//!
//! One S-class monitor hart with 8 PMP regions and four application harts
//! with 16. Both UARTs hang off the fixed `hfclk`.

use super::Platform;
use crate::device::{DeviceTable, HartDescriptor, UartDescriptor};
use crate::hal::clock::Clock;
use crate::hal::dma::DmaController;
use crate::hal::uart::Uart;
use crate::peripheral::clock::ExternalClock;
use crate::peripheral::nb2uart0::Nb2Uart0;

pub const HFCLK_HZ: u64 = 26_000_000;

pub const UART0_BASE: usize = 0x1006_0000;
pub const UART1_BASE: usize = 0x1006_1000;

pub const UART0_IRQ: u32 = 41;
pub const UART1_IRQ: u32 = 42;

pub struct FreedomNb2;

static HARTS: [HartDescriptor; 5] = [
    HartDescriptor { hart_id: 0, pmp_regions: 8 },
    HartDescriptor { hart_id: 1, pmp_regions: 16 },
    HartDescriptor { hart_id: 2, pmp_regions: 16 },
    HartDescriptor { hart_id: 3, pmp_regions: 16 },
    HartDescriptor { hart_id: 4, pmp_regions: 16 },
];

static HFCLK_SOURCE: ExternalClock = ExternalClock::new(HFCLK_HZ);
static HFCLK: Clock = Clock::new("hfclk", &HFCLK_SOURCE);

static UART0: Nb2Uart0 = unsafe {
    Nb2Uart0::new(UartDescriptor {
        base: UART0_BASE,
        clock: Some(&HFCLK),
        interrupt_line: Some(UART0_IRQ),
    })
};

static UART1: Nb2Uart0 = unsafe {
    Nb2Uart0::new(UartDescriptor {
        base: UART1_BASE,
        clock: Some(&HFCLK),
        interrupt_line: Some(UART1_IRQ),
    })
};

static CLOCKS: [&Clock; 1] = [&HFCLK];
static UARTS: [&dyn Uart; 2] = [&UART0, &UART1];
static DMAS: [&dyn DmaController; 0] = [];

impl Platform for FreedomNb2 {
    fn name() -> &'static str {
        "SiFive Freedom NB2"
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
