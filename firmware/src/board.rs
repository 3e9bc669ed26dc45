#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Board constants for the STM32G0 speed trap controller.
//!
//! Pin assignment (all push-pull outputs at 3.3 V):
//!
//! | Signal          | MCU pin | Notes                               |
//! |-----------------|---------|-------------------------------------|
//! | Entry strip     | PA0     | input, internal pull-up, active low |
//! | Exit strip      | PA1     | input, internal pull-up, active low |
//! | LED 1..4        | PA4-PA7 | counter bit 0..3, active high       |
//! | Segment A..F    | PB0-PB5 | active high                         |
//! | Segment G       | PB6     | active high                         |
//! | Digit 1..4      | PA8, PA9, PA10, PA15 | strobe, active low     |
//!
//! Digit 1 shows the ones place.

use speedtrap_core::clock::{TICK_RATE_HZ, TimerPrescaler, compare_match_value};

/// Core clock after reset with the default HSI16 configuration.
pub const CORE_CLOCK_HZ: u32 = 16_000_000;

/// SysTick counts core clock cycles directly.
pub const SYSTICK_PRESCALER: TimerPrescaler = TimerPrescaler::Direct;

/// Largest value the 24-bit SysTick reload register accepts.
pub const SYSTICK_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// SysTick reload value producing the 1 kHz millisecond tick.
pub const SYSTICK_RELOAD: u32 =
    match compare_match_value(CORE_CLOCK_HZ, SYSTICK_PRESCALER, TICK_RATE_HZ) {
        Some(reload) if reload <= SYSTICK_MAX_RELOAD => reload,
        _ => panic!("core clock cannot produce a 1 kHz SysTick"),
    };

/// Digit strobes sink the common anode, so a low level lights the digit.
pub const DIGIT_STROBE_ACTIVE_HIGH: bool = false;

/// Pin level for a digit strobe: high when `active` matches the active level.
#[must_use]
pub const fn strobe_is_high(active: bool) -> bool {
    active == DIGIT_STROBE_ACTIVE_HIGH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn systick_reload_matches_core_clock() {
        assert_eq!(SYSTICK_RELOAD, 15_999);
        assert_eq!(
            (SYSTICK_RELOAD + 1) * TICK_RATE_HZ,
            CORE_CLOCK_HZ / SYSTICK_PRESCALER.divisor()
        );
    }

    #[test]
    fn active_digit_strobe_drives_low() {
        assert!(!strobe_is_high(true));
        assert!(strobe_is_high(false));
    }
}
