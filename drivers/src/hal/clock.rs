//! Clock Hardware Abstraction Layer and rate-change notification hub.
//!
//! A [`Clock`] wraps one [`ClockSource`] and keeps two ordered listener
//! lists. [`Clock::request_rate_change`] runs the two-phase protocol:
//!
//! ```text
//! Stable -> ChangePending -> (pre listeners) -> program source
//!        -> (post listeners) -> Stable
//! ```
//!
//! Dependent drivers register at their own initialization and use the post
//! phase to recompute derived state, such as a baud divisor.

use alloc::vec::Vec;
use log::trace;
use spin::Mutex;

/// Clock source capability table.
pub trait ClockSource: Sync {
    /// Current output rate in hertz.
    fn rate_hz(&self) -> u64;

    /// Program the source for `rate_hz` and return the rate it now runs at.
    fn set_rate_hz(&self, rate_hz: u64) -> u64;
}

/// Callback run before the rate changes.
///
/// The implementing object is the callback context; the hub only keeps a
/// shared reference to it.
pub trait PreRateChange: Sync {
    fn pre_rate_change(&self, clock: &Clock);
}

/// Callback run after the rate has changed.
pub trait PostRateChange: Sync {
    fn post_rate_change(&self, clock: &Clock);
}

/// Where a clock is in the rate-change protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockPhase {
    Stable,
    ChangePending,
}

/// A clock instance shared by the peripherals it feeds.
pub struct Clock {
    name: &'static str,
    source: &'static dyn ClockSource,
    phase: Mutex<ClockPhase>,
    pre_change: Mutex<Vec<&'static dyn PreRateChange>>,
    post_change: Mutex<Vec<&'static dyn PostRateChange>>,
}

impl Clock {
    pub const fn new(name: &'static str, source: &'static dyn ClockSource) -> Self {
        Self {
            name,
            source,
            phase: Mutex::new(ClockPhase::Stable),
            pre_change: Mutex::new(Vec::new()),
            post_change: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current rate in hertz.
    pub fn rate_hz(&self) -> u64 {
        self.source.rate_hz()
    }

    pub fn phase(&self) -> ClockPhase {
        *self.phase.lock()
    }

    /// Append a pre-change listener. Registrations are permanent and not
    /// de-duplicated.
    pub fn register_pre_change(&self, listener: &'static dyn PreRateChange) {
        self.pre_change.lock().push(listener);
    }

    /// Append a post-change listener. Registrations are permanent and not
    /// de-duplicated.
    pub fn register_post_change(&self, listener: &'static dyn PostRateChange) {
        self.post_change.lock().push(listener);
    }

    /// Number of registered (pre, post) listeners.
    pub fn listener_counts(&self) -> (usize, usize) {
        (self.pre_change.lock().len(), self.post_change.lock().len())
    }

    fn pre_listener(&self, index: usize) -> Option<&'static dyn PreRateChange> {
        self.pre_change.lock().get(index).copied()
    }

    fn post_listener(&self, index: usize) -> Option<&'static dyn PostRateChange> {
        self.post_change.lock().get(index).copied()
    }

    /// Change the clock rate, notifying every listener in registration order.
    ///
    /// Returns the rate the source settled on. No list lock is held while a
    /// listener runs, so listeners may register more listeners or query this
    /// clock. Listeners added during a phase first run on the next change.
    /// Listeners must not request a rate change on the same clock.
    pub fn request_rate_change(&self, rate_hz: u64) -> u64 {
        {
            let mut phase = self.phase.lock();
            debug_assert_eq!(
                *phase,
                ClockPhase::Stable,
                "{}: rate change requested from inside a rate-change listener",
                self.name
            );
            *phase = ClockPhase::ChangePending;
        }

        trace!("{}: {} Hz -> {} Hz", self.name, self.rate_hz(), rate_hz);

        let (pre_count, post_count) = self.listener_counts();

        for listener in (0..pre_count).filter_map(|i| self.pre_listener(i)) {
            listener.pre_rate_change(self);
        }

        let achieved = self.source.set_rate_hz(rate_hz);

        for listener in (0..post_count).filter_map(|i| self.post_listener(i)) {
            listener.post_rate_change(self);
        }

        *self.phase.lock() = ClockPhase::Stable;
        trace!("{}: settled at {} Hz", self.name, achieved);
        achieved
    }
}
