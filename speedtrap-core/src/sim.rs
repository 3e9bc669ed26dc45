//! Simulated hardware for host-side tests and the emulator.
//!
//! [`ManualClock`] only moves when told to, and [`SimDelay`] advances it
//! instead of sleeping, so a whole control loop can run deterministically.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use heapless::{HistoryBuf as HistoryBuffer, Vec};

use crate::clock::{Millis, MonotonicClock};
use crate::display::{DIGIT_COUNT, DigitPosition, DisplayDriver, Segments};
use crate::indicator::{IndicatorDriver, LED_COUNT, LedId};
use crate::trigger::{TriggerId, TriggerInputs, TriggerSample};

const NANOS_PER_MILLI: u32 = 1_000_000;

/// Number of display operations kept by [`CapturedDisplay`].
pub const DISPLAY_OP_HISTORY: usize = 32;

/// Clock advanced explicitly by the test or by [`SimDelay`].
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u32>,
}

impl ManualClock {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    #[must_use]
    pub const fn starting_at(millis: u32) -> Self {
        Self {
            now_ms: Cell::new(millis),
        }
    }

    pub fn advance_ms(&self, millis: u32) {
        self.now_ms.set(self.now_ms.get().wrapping_add(millis));
    }

    pub fn set_ms(&self, millis: u32) {
        self.now_ms.set(millis);
    }

    #[must_use]
    pub fn now_ms(&self) -> u32 {
        self.now_ms.get()
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Millis {
        Millis::new(self.now_ms.get())
    }
}

/// Delay that advances a [`ManualClock`] rather than blocking.
pub struct SimDelay<'a> {
    clock: &'a ManualClock,
    pending_ns: u32,
}

impl<'a> SimDelay<'a> {
    #[must_use]
    pub const fn new(clock: &'a ManualClock) -> Self {
        Self {
            clock,
            pending_ns: 0,
        }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let total = u64::from(self.pending_ns) + u64::from(ns);
        let whole_ms = total / u64::from(NANOS_PER_MILLI);
        let remainder = total % u64::from(NANOS_PER_MILLI);
        self.clock
            .advance_ms(u32::try_from(whole_ms).unwrap_or(u32::MAX));
        self.pending_ns = u32::try_from(remainder).unwrap_or(0);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ms(ms);
    }
}

/// Trigger inputs set directly by the caller.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScriptedTriggers {
    sample: TriggerSample,
}

impl ScriptedTriggers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sample: TriggerSample::RELEASED,
        }
    }

    pub fn set(&mut self, id: TriggerId, triggered: bool) {
        match id {
            TriggerId::First => self.sample.first = triggered,
            TriggerId::Second => self.sample.second = triggered,
        }
    }

    pub fn release_all(&mut self) {
        self.sample = TriggerSample::RELEASED;
    }
}

impl TriggerInputs for ScriptedTriggers {
    fn is_triggered(&mut self, id: TriggerId) -> bool {
        self.sample.line(id)
    }
}

/// Display operation recorded by [`CapturedDisplay`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DisplayOp {
    SetSegments(Segments),
    Select(DigitPosition),
    DeselectAll,
}

/// Display driver that remembers what each position last showed.
#[derive(Default)]
pub struct CapturedDisplay {
    segments: Segments,
    selected: Option<DigitPosition>,
    shown: [Segments; DIGIT_COUNT],
    strobes: u32,
    ops: HistoryBuffer<DisplayOp, DISPLAY_OP_HISTORY>,
}

impl CapturedDisplay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Segments::BLANK,
            selected: None,
            shown: [Segments::BLANK; DIGIT_COUNT],
            strobes: 0,
            ops: HistoryBuffer::new(),
        }
    }

    /// Pattern latched the last time `position` was strobed.
    #[must_use]
    pub const fn shown(&self, position: DigitPosition) -> Segments {
        self.shown[position.as_index()]
    }

    /// All four positions, ones first.
    #[must_use]
    pub const fn shown_all(&self) -> [Segments; DIGIT_COUNT] {
        self.shown
    }

    #[must_use]
    pub const fn selected(&self) -> Option<DigitPosition> {
        self.selected
    }

    /// Total number of digit strobes so far.
    #[must_use]
    pub const fn strobes(&self) -> u32 {
        self.strobes
    }

    /// Most recent operations, oldest first.
    #[must_use]
    pub fn ops(&self) -> Vec<DisplayOp, DISPLAY_OP_HISTORY> {
        self.ops.oldest_ordered().copied().collect()
    }
}

impl DisplayDriver for CapturedDisplay {
    fn set_segments(&mut self, segments: Segments) {
        self.segments = segments;
        self.ops.write(DisplayOp::SetSegments(segments));
    }

    fn select_digit(&mut self, position: DigitPosition) {
        self.selected = Some(position);
        self.shown[position.as_index()] = self.segments;
        self.strobes = self.strobes.wrapping_add(1);
        self.ops.write(DisplayOp::Select(position));
    }

    fn deselect_all(&mut self) {
        self.selected = None;
        self.ops.write(DisplayOp::DeselectAll);
    }
}

/// Indicator driver that records LED states.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CapturedLeds {
    states: [bool; LED_COUNT],
    writes: u32,
}

impl CapturedLeds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: [false; LED_COUNT],
            writes: 0,
        }
    }

    #[must_use]
    pub const fn states(&self) -> [bool; LED_COUNT] {
        self.states
    }

    /// Value shown in binary across the four LEDs.
    #[must_use]
    pub fn value(&self) -> u8 {
        LedId::ALL
            .iter()
            .filter(|led| self.states[usize::from(led.bit())])
            .fold(0, |acc, led| acc | (1 << led.bit()))
    }

    #[must_use]
    pub const fn writes(&self) -> u32 {
        self.writes
    }
}

impl IndicatorDriver for CapturedLeds {
    fn set_led(&mut self, led: LedId, on: bool) {
        self.states[usize::from(led.bit())] = on;
        self.writes = self.writes.wrapping_add(1);
    }
}
