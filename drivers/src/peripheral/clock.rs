//! Clock source drivers.

use crate::hal::clock::ClockSource;
use crate::hal::mmio::{Mmio, RegisterIo};
use common::math::div_round_closest;
use log::{debug, trace};
use spin::Mutex;

/// A clock whose rate is set up elsewhere (a crystal, a PLL programmed by the
/// boot ROM). The driver only records the rate it is told about.
pub struct ExternalClock {
    rate_hz: Mutex<u64>,
}

impl ExternalClock {
    pub const fn new(rate_hz: u64) -> Self {
        Self {
            rate_hz: Mutex::new(rate_hz),
        }
    }
}

impl ClockSource for ExternalClock {
    fn rate_hz(&self) -> u64 {
        *self.rate_hz.lock()
    }

    fn set_rate_hz(&self, rate_hz: u64) -> u64 {
        *self.rate_hz.lock() = rate_hz;
        rate_hz
    }
}

const DIV_MASK: u32 = 0x3F;
const MAX_DIV: u64 = DIV_MASK as u64;
const MUX_ALTERNATE: u32 = 1 << 0;

/// FE310-G000 low-frequency ring oscillator.
///
/// The output is either the internal oscillator divided by `div + 1` or the
/// external always-on clock, depending on the mux register.
pub struct Fe310LfRosc<R: RegisterIo = Mmio> {
    config: R,
    mux: R,
    lfrosc: &'static dyn ClockSource,
    alternate: &'static dyn ClockSource,
}

impl Fe310LfRosc<Mmio> {
    /// # Safety
    ///
    /// `config` and `mux` must be the addresses of the oscillator's
    /// configuration and mux registers.
    pub const unsafe fn new(
        config: usize,
        mux: usize,
        lfrosc: &'static dyn ClockSource,
        alternate: &'static dyn ClockSource,
    ) -> Self {
        unsafe { Self::with_registers(Mmio::new(config), Mmio::new(mux), lfrosc, alternate) }
    }
}

impl<R: RegisterIo> Fe310LfRosc<R> {
    pub const fn with_registers(
        config: R,
        mux: R,
        lfrosc: &'static dyn ClockSource,
        alternate: &'static dyn ClockSource,
    ) -> Self {
        Self {
            config,
            mux,
            lfrosc,
            alternate,
        }
    }

    fn alternate_selected(&self) -> bool {
        self.mux.read32(0) & MUX_ALTERNATE != 0
    }

    fn divider(&self) -> u64 {
        (self.config.read32(0) & DIV_MASK) as u64
    }
}

impl<R: RegisterIo> ClockSource for Fe310LfRosc<R> {
    fn rate_hz(&self) -> u64 {
        if self.alternate_selected() {
            self.alternate.rate_hz()
        } else {
            self.lfrosc.rate_hz() / (self.divider() + 1)
        }
    }

    fn set_rate_hz(&self, rate_hz: u64) -> u64 {
        if self.alternate_selected() {
            trace!("lfrosc: alternate clock selected, rate fixed");
            return self.rate_hz();
        }

        let div = match rate_hz {
            0 => MAX_DIV,
            _ => div_round_closest(self.lfrosc.rate_hz(), rate_hz)
                .saturating_sub(1)
                .min(MAX_DIV),
        };
        self.config.modify32(0, DIV_MASK, div as u32);

        let achieved = self.rate_hz();
        debug!("lfrosc: div {} for {} Hz, running at {} Hz", div, rate_hz, achieved);
        achieved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    struct Register(Mutex<u32>);

    impl RegisterIo for Register {
        fn read32(&self, _offset: usize) -> u32 {
            *self.0.lock()
        }

        fn write32(&self, _offset: usize, value: u32) {
            *self.0.lock() = value;
        }
    }

    fn leak<T>(value: T) -> &'static T {
        Box::leak(Box::new(value))
    }

    fn lfrosc(config: u32, mux: u32) -> Fe310LfRosc<Register> {
        Fe310LfRosc::with_registers(
            Register(Mutex::new(config)),
            Register(Mutex::new(mux)),
            leak(ExternalClock::new(32_768 * 64)),
            leak(ExternalClock::new(32_768)),
        )
    }

    #[test]
    fn external_clock_records_rate() {
        let clock = ExternalClock::new(16_000_000);

        assert_eq!(clock.rate_hz(), 16_000_000);
        assert_eq!(clock.set_rate_hz(32_000_000), 32_000_000);
        assert_eq!(clock.rate_hz(), 32_000_000);
    }

    #[test]
    fn lfrosc_divides_internal_oscillator() {
        let clock = lfrosc(0x4000_0003, 0);

        assert_eq!(clock.rate_hz(), 32_768 * 16);
    }

    #[test]
    fn lfrosc_programs_nearest_divider() {
        let clock = lfrosc(0x4010_0000, 0);

        assert_eq!(clock.set_rate_hz(32_768 * 8), 32_768 * 8);
        assert_eq!(clock.config.read32(0), 0x4010_0007);

        assert_eq!(clock.set_rate_hz(1), 32_768);
        assert_eq!(clock.config.read32(0) & DIV_MASK, 63);

        assert_eq!(clock.set_rate_hz(u64::MAX), 32_768 * 64);
        assert_eq!(clock.config.read32(0) & DIV_MASK, 0);
    }

    #[test]
    fn alternate_clock_cannot_be_reprogrammed() {
        let clock = lfrosc(0x0000_0005, MUX_ALTERNATE);

        assert_eq!(clock.rate_hz(), 32_768);
        assert_eq!(clock.set_rate_hz(1_000), 32_768);
        assert_eq!(clock.config.read32(0), 0x0000_0005);
    }
}
