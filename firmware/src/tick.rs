//! SysTick-driven millisecond counter.
//!
//! The exception handler is the only writer of [`MILLIS`]; the control loop
//! reads it through [`speedtrap_core::clock::MonotonicClock`].

use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;
use speedtrap_core::clock::MillisCounter;

use crate::board::SYSTICK_RELOAD;

/// Milliseconds since SysTick was started.
pub static MILLIS: MillisCounter = MillisCounter::new();

/// Starts SysTick at 1 kHz with its exception enabled.
pub fn start(mut syst: SYST) {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(SYSTICK_RELOAD);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
    defmt::debug!("tick: systick reload={}", SYSTICK_RELOAD);
}

#[exception]
fn SysTick() {
    MILLIS.tick();
}
