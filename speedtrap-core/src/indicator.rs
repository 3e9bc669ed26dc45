//! Rolling event counter and its four-LED binary readout.

use core::fmt;

/// Number of indicator LEDs, one per counter bit.
pub const LED_COUNT: usize = 4;

/// Count of completed captures, modulo 16.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventCounter(u8);

impl EventCounter {
    /// Highest value before the counter rolls back to zero.
    pub const MAX: u8 = 15;

    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Counts one event and returns the new value, wrapping 15 -> 0.
    pub fn advance(&mut self) -> u8 {
        self.0 = (self.0 + 1) & Self::MAX;
        self.0
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EventCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Indicator LEDs, numbered as on the front panel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedId {
    Led1,
    Led2,
    Led3,
    Led4,
}

impl LedId {
    pub const ALL: [LedId; LED_COUNT] = [LedId::Led1, LedId::Led2, LedId::Led3, LedId::Led4];

    /// Counter bit shown by this LED.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            LedId::Led1 => 0,
            LedId::Led2 => 1,
            LedId::Led3 => 2,
            LedId::Led4 => 3,
        }
    }
}

/// On/off state for each indicator LED.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorPattern([bool; LED_COUNT]);

impl IndicatorPattern {
    #[must_use]
    pub fn from_counter(counter: EventCounter) -> Self {
        Self(LedId::ALL.map(|led| counter.value() & (1 << led.bit()) != 0))
    }

    #[must_use]
    pub const fn is_on(&self, led: LedId) -> bool {
        self.0[led.bit() as usize]
    }

    #[must_use]
    pub const fn states(&self) -> [bool; LED_COUNT] {
        self.0
    }
}

/// Abstraction over the indicator LED outputs.
pub trait IndicatorDriver {
    fn set_led(&mut self, led: LedId, on: bool);
}

/// Drives every LED from the counter's current value.
pub fn show_counter<L>(counter: EventCounter, leds: &mut L)
where
    L: IndicatorDriver + ?Sized,
{
    let pattern = IndicatorPattern::from_counter(counter);
    for led in LedId::ALL {
        leds.set_led(led, pattern.is_on(led));
    }
}
