//! Embassy GPIO adapters for the speed trap driver traits.

use embassy_stm32::gpio::{Input, Level, Output};
use speedtrap_core::display::{DIGIT_COUNT, DigitPosition, DisplayDriver, Segment, Segments};
use speedtrap_core::indicator::{IndicatorDriver, LED_COUNT, LedId};
use speedtrap_core::trigger::{TriggerId, TriggerInputs, TriggerPolarity};

use crate::board::strobe_is_high;

const SEGMENT_COUNT: usize = Segment::ALL.len();

fn strobe_level(active: bool) -> Level {
    Level::from(strobe_is_high(active))
}

/// Entry and exit strip inputs.
pub struct HardwareTriggers<'d> {
    entry: Input<'d>,
    exit: Input<'d>,
    polarity: TriggerPolarity,
}

impl<'d> HardwareTriggers<'d> {
    pub fn new(entry: Input<'d>, exit: Input<'d>, polarity: TriggerPolarity) -> Self {
        Self {
            entry,
            exit,
            polarity,
        }
    }
}

impl TriggerInputs for HardwareTriggers<'_> {
    fn is_triggered(&mut self, id: TriggerId) -> bool {
        let input = match id {
            TriggerId::First => &self.entry,
            TriggerId::Second => &self.exit,
        };
        self.polarity.is_triggered(input.is_high())
    }
}

/// Segment lines (A..G) and digit strobes (ones first).
pub struct HardwareDisplay<'d> {
    segments: [Output<'d>; SEGMENT_COUNT],
    digits: [Output<'d>; DIGIT_COUNT],
}

impl<'d> HardwareDisplay<'d> {
    pub fn new(segments: [Output<'d>; SEGMENT_COUNT], digits: [Output<'d>; DIGIT_COUNT]) -> Self {
        Self { segments, digits }
    }
}

impl DisplayDriver for HardwareDisplay<'_> {
    fn set_segments(&mut self, segments: Segments) {
        for (output, segment) in self.segments.iter_mut().zip(Segment::ALL) {
            output.set_level(Level::from(segments.is_lit(segment)));
        }
    }

    fn select_digit(&mut self, position: DigitPosition) {
        self.digits[position.as_index()].set_level(strobe_level(true));
    }

    fn deselect_all(&mut self) {
        for digit in &mut self.digits {
            digit.set_level(strobe_level(false));
        }
    }
}

/// Counter LEDs, bit 0 first.
pub struct HardwareLeds<'d> {
    leds: [Output<'d>; LED_COUNT],
}

impl<'d> HardwareLeds<'d> {
    pub fn new(leds: [Output<'d>; LED_COUNT]) -> Self {
        Self { leds }
    }
}

impl IndicatorDriver for HardwareLeds<'_> {
    fn set_led(&mut self, led: LedId, on: bool) {
        self.leds[usize::from(led.bit())].set_level(Level::from(on));
    }
}
