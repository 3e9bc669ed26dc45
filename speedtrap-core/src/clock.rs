//! Millisecond timekeeping shared by the tick interrupt and the control loop.
//!
//! The tick handler is the only writer of [`MillisCounter`]; the control loop
//! reads snapshots through [`MillisCounter::now`]. The backing atomic falls
//! back to a critical section on cores without native 32-bit atomics, so a
//! snapshot is never torn by a concurrent increment.

use core::fmt;

use portable_atomic::{AtomicU32, Ordering};

/// Nominal period of one clock tick.
pub const TICK_PERIOD_MS: u32 = 1;

/// Tick frequency the hardware timer is configured for.
pub const TICK_RATE_HZ: u32 = 1_000 / TICK_PERIOD_MS;

/// Milliseconds since start-up. Wraps at `u32::MAX` after roughly 49.7 days.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(u32);

impl Millis {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, modulo the counter width.
    ///
    /// A capture that straddles the counter overflow still yields the true
    /// elapsed time as long as it is shorter than one full wrap.
    #[must_use]
    pub const fn elapsed_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    #[must_use]
    pub const fn wrapping_add(self, millis: u32) -> Self {
        Self(self.0.wrapping_add(millis))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of monotonic millisecond timestamps.
pub trait MonotonicClock {
    fn now(&self) -> Millis;
}

/// Free-running millisecond counter advanced from a timer interrupt.
pub struct MillisCounter {
    ticks: AtomicU32,
}

impl MillisCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advances the counter by one tick. Call only from the tick interrupt.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a consistent snapshot of the counter.
    #[must_use]
    pub fn now(&self) -> Millis {
        Millis(self.ticks.load(Ordering::Relaxed))
    }
}

impl Default for MillisCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for MillisCounter {
    fn now(&self) -> Millis {
        MillisCounter::now(self)
    }
}

/// Clock prescaler applied ahead of the tick timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerPrescaler {
    Direct,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl TimerPrescaler {
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            TimerPrescaler::Direct => 1,
            TimerPrescaler::Div8 => 8,
            TimerPrescaler::Div64 => 64,
            TimerPrescaler::Div256 => 256,
            TimerPrescaler::Div1024 => 1024,
        }
    }
}

/// Compare-match (or reload) register value that makes a timer clocked at
/// `clock_hz / prescaler` fire `tick_hz` times per second.
///
/// Returns `None` when the requested rate cannot be reached, i.e. the
/// prescaled clock is slower than the tick rate.
#[must_use]
pub const fn compare_match_value(
    clock_hz: u32,
    prescaler: TimerPrescaler,
    tick_hz: u32,
) -> Option<u32> {
    if tick_hz == 0 {
        return None;
    }
    let counts = clock_hz / prescaler.divisor() / tick_hz;
    if counts == 0 {
        None
    } else {
        Some(counts - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_wraps_across_counter_overflow() {
        let start = Millis::new(u32::MAX - 99);
        let end = start.wrapping_add(600);
        assert_eq!(end.as_u32(), 500);
        assert_eq!(end.elapsed_since(start), 600);
    }

    #[test]
    fn counter_ticks_are_visible_to_readers() {
        let counter = MillisCounter::new();
        assert_eq!(counter.now(), Millis::ZERO);
        for _ in 0..250 {
            counter.tick();
        }
        assert_eq!(counter.now(), Millis::new(250));
    }

    #[test]
    fn reference_board_compare_value() {
        // 16 MHz core, /64 prescaler, 1 kHz tick.
        assert_eq!(
            compare_match_value(16_000_000, TimerPrescaler::Div64, TICK_RATE_HZ),
            Some(249)
        );
        assert_eq!(
            compare_match_value(16_000_000, TimerPrescaler::Direct, TICK_RATE_HZ),
            Some(15_999)
        );
    }

    #[test]
    fn unreachable_tick_rate_is_rejected() {
        assert_eq!(
            compare_match_value(500_000, TimerPrescaler::Div1024, TICK_RATE_HZ),
            None
        );
        assert_eq!(compare_match_value(16_000_000, TimerPrescaler::Div8, 0), None);
    }
}
