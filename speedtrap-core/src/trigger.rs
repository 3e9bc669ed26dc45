//! Trigger line sampling and edge detection.
//!
//! Each control-loop iteration takes one [`TriggerSample`] of both lines and
//! feeds it to the [`TriggerSampler`], which reports lines that just became
//! triggered. There is no filtering beyond the single-sample comparison;
//! contact bounce is absorbed by the loop pacing delay alone.

/// Identifier for the two trigger strips.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerId {
    /// Entry strip; starts a capture.
    First,
    /// Exit strip; completes a capture.
    Second,
}

impl TriggerId {
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            TriggerId::First => 0,
            TriggerId::Second => 1,
        }
    }
}

/// Electrical level that means "triggered" on a line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerPolarity {
    /// Pulled up at rest, shorted to ground by the strip.
    ActiveLow,
    ActiveHigh,
}

impl TriggerPolarity {
    /// Maps a raw pin level to the logical triggered state.
    #[must_use]
    pub const fn is_triggered(self, level_high: bool) -> bool {
        match self {
            TriggerPolarity::ActiveLow => !level_high,
            TriggerPolarity::ActiveHigh => level_high,
        }
    }
}

/// Logical state of both lines at one instant.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerSample {
    pub first: bool,
    pub second: bool,
}

impl TriggerSample {
    /// Both lines released.
    pub const RELEASED: Self = Self {
        first: false,
        second: false,
    };

    #[must_use]
    pub const fn new(first: bool, second: bool) -> Self {
        Self { first, second }
    }

    #[must_use]
    pub const fn line(&self, id: TriggerId) -> bool {
        match id {
            TriggerId::First => self.first,
            TriggerId::Second => self.second,
        }
    }
}

/// Edges detected during one iteration.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerEdges {
    pub first_fell: bool,
    pub second_fell: bool,
}

impl TriggerEdges {
    pub const NONE: Self = Self {
        first_fell: false,
        second_fell: false,
    };
}

/// Previous/current pair for a single line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    /// Starts with the line released.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: false }
    }

    /// Records `triggered` and reports whether the line just became active.
    pub fn update(&mut self, triggered: bool) -> bool {
        let fell = triggered && !self.previous;
        self.previous = triggered;
        fell
    }
}

/// Edge detection for both trigger lines.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerSampler {
    first: EdgeDetector,
    second: EdgeDetector,
}

impl TriggerSampler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            first: EdgeDetector::new(),
            second: EdgeDetector::new(),
        }
    }

    /// Consumes one sample and returns the edges it produced.
    pub fn update(&mut self, sample: TriggerSample) -> TriggerEdges {
        TriggerEdges {
            first_fell: self.first.update(sample.first),
            second_fell: self.second.update(sample.second),
        }
    }
}

/// Abstraction over the physical trigger inputs.
pub trait TriggerInputs {
    /// Returns `true` while the line is triggered, after polarity mapping.
    fn is_triggered(&mut self, id: TriggerId) -> bool;

    /// Reads both lines back to back.
    fn sample(&mut self) -> TriggerSample {
        TriggerSample {
            first: self.is_triggered(TriggerId::First),
            second: self.is_triggered(TriggerId::Second),
        }
    }
}
